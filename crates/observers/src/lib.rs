//! Reusable observers for autofocus searches.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the search strategies in `focus-search`.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-strategy observers
//!   ([`HasMetric`], [`HasPosition`], [`CanStopEarly`], [`CanDiscard`])
//!
//! # Observers
//!
//! - [`MetricTarget`] — stops once the metric reaches a target
//! - [`RejectBelow`] — discards samples under a metric floor
//! - [`Recorder`] — keeps every reported sample
//!
//! [`Observer`]: focus_core::Observer
//! [`HasMetric`]: traits::HasMetric
//! [`HasPosition`]: traits::HasPosition
//! [`CanStopEarly`]: traits::CanStopEarly
//! [`CanDiscard`]: traits::CanDiscard

pub mod traits;

mod metric_target;
mod recorder;
mod reject_below;

pub use metric_target::MetricTarget;
pub use recorder::Recorder;
pub use reject_below::RejectBelow;
