/// Actions an observer can take during a hill climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop climbing and leave the actuator where it is.
    StopEarly,
}
