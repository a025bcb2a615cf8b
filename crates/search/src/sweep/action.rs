/// Actions an observer can take during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop sweeping and leave the actuator where it is.
    StopEarly,

    /// Exclude this sample from peak selection.
    ///
    /// Use this for frames known to be unusable, such as a saturated or
    /// motion-blurred capture. The sweep continues to the next position.
    Discard,
}
