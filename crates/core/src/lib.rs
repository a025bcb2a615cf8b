//! Core traits and types for single-axis autofocus control.
//!
//! This crate defines the shared vocabulary that the search strategies,
//! observers, and device adapters build on:
//!
//! - [`Position`], [`Direction`] — actuator coordinates along the focus axis
//! - [`ContrastSample`] — one sharpness measurement tagged with its position
//! - [`SearchRange`] — the validated span and step of a search
//! - [`SearchState`] — progress of a search session
//! - [`ImageSource`], [`Actuator`], [`DeviceStore`] — the device collaborators
//!   a search drives
//! - [`Observer`] — receives search events and optionally returns control actions
//! - [`CancelToken`] — cooperative cancellation shared across threads

mod cancel;
mod device;
mod direction;
mod observer;
mod range;
mod sample;
mod state;

pub use cancel::CancelToken;
pub use device::{Actuator, DeviceStore, ImageSource, keys};
pub use direction::Direction;
pub use observer::Observer;
pub use range::{RangeError, SearchRange};
pub use sample::ContrastSample;
pub use state::SearchState;

/// Actuator coordinate along the focus axis, in motor steps.
pub type Position = i64;
