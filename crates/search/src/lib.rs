//! Search controllers for contrast-detection autofocus.
//!
//! A search drives one focus actuator, samples a sharpness metric from an
//! image source, and leaves the actuator at the sharpest position it found.
//! Every search runs inside a [`Session`], which owns the devices, tracks the
//! expected actuator position, and enforces cancellation and deadlines.
//!
//! # Strategies
//!
//! - [`hill_climb`] — adaptive-step climb that halves its step at each
//!   reversal, for unimodal contrast curves
//! - [`sweep`] — exhaustive stepped sweep with arg-max selection
//!
//! Both are also available behind the [`Strategy`] trait, and as the two
//! workflow passes [`pupil_autofocus`] and [`retina_autofocus`].

mod config;
mod error;
mod profile;
mod sampler;
mod session;
mod slope;
mod solution;
mod strategy;

pub mod hill_climb;
pub mod sweep;

pub use config::{Bounds, Config, ConfigError, Timing};
pub use error::Error;
pub use profile::{Anchor, Profile, pupil_autofocus, retina_autofocus};
pub use session::Session;
pub use slope::SlopeEstimate;
pub use solution::{Solution, Status};
pub use strategy::{HillClimb, Strategy, StrategyKind, Sweep};
