//! A simulated lens rig for exercising autofocus searches without hardware.
//!
//! A [`Rig`] models one focus axis: a lens position, a synthetic contrast
//! curve over that position, and a small calibration store. Its
//! [`parts`](Rig::parts) implement the three device traits from
//! [`focus_core`] and share the same lens, so a test can hand them to a
//! search session and then inspect what the search did through the rig.
//!
//! Faults can be injected: empty frames before a capture succeeds, a motor
//! that stops responding, and a motor that starts returning errors.

pub mod curves;
mod rig;

pub use rig::{Camera, Motor, Move, Rig, SimError, Store};
