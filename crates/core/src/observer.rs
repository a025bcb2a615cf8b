/// Receives events from a search and optionally returns a control action.
///
/// Returning `None` lets the search continue unchanged. Each strategy defines
/// its own event and action types.
///
/// Implemented for `()` (observes nothing) and for any
/// `FnMut(&E) -> Option<A>` closure.
pub trait Observer<E, A> {
    /// Observes one event.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
