//! Capability traits for cross-strategy observers.
//!
//! These traits abstract over strategy-specific event and action types, so an
//! observer can be written once and attached to any search.
//!
//! # Event traits
//!
//! - [`HasMetric`] — events that carry a contrast metric
//! - [`HasPosition`] — events that carry the actuator position of that metric
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can stop a search where it is
//! - [`CanDiscard`] — actions that can exclude a sample from peak selection
//!
//! # Example
//!
//! ```rust
//! use focus_core::Observer;
//! use focus_observers::traits::{CanStopEarly, HasPosition};
//!
//! struct StopPast {
//!     limit: i64,
//! }
//!
//! impl<E: HasPosition, A: CanStopEarly> Observer<E, A> for StopPast {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.position() > self.limit).then(A::stop_early)
//!     }
//! }
//! ```

use focus_core::Position;
use focus_search::{hill_climb, sweep};

/// An event that carries a contrast metric.
pub trait HasMetric {
    /// Returns the metric this event reports.
    fn metric(&self) -> f64;
}

/// An event that carries an actuator position.
pub trait HasPosition {
    /// Returns the position at which the event's metric was measured.
    fn position(&self) -> Position;
}

/// An action type that can stop a search early.
pub trait CanStopEarly {
    /// Returns the action that stops the search.
    fn stop_early() -> Self;
}

/// An action type that can exclude the current sample.
pub trait CanDiscard {
    /// Returns the action that discards the sample.
    fn discard() -> Self;
}

// --- hill_climb ---

impl HasMetric for hill_climb::Event {
    fn metric(&self) -> f64 {
        self.sample().metric
    }
}

impl HasPosition for hill_climb::Event {
    fn position(&self) -> Position {
        self.sample().position
    }
}

impl CanStopEarly for hill_climb::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

// --- sweep ---

impl HasMetric for sweep::Event {
    fn metric(&self) -> f64 {
        self.sample().metric
    }
}

impl HasPosition for sweep::Event {
    fn position(&self) -> Position {
        self.sample().position
    }
}

impl CanStopEarly for sweep::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanDiscard for sweep::Action {
    fn discard() -> Self {
        Self::Discard
    }
}
