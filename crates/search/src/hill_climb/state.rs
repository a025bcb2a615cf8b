use std::time::Duration;

use focus_core::Direction;

use super::Policy;

/// What the climb does after a probe.
///
/// Deltas are measured from where the probe started, so the caller must
/// subtract the probe displacement before moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    /// Move by the signed delta and keep climbing.
    Move(i64),

    /// Make a final corrective move by the signed delta and stop.
    Finish(i64),

    /// Every slope so far was zero: there is nothing to climb.
    Flat,
}

/// Mutable state of one hill-climbing session.
#[derive(Debug, Clone)]
pub(super) struct State {
    direction: Direction,
    move_step: i64,
    delay: Duration,
    past_slope: f64,
    turns: usize,
    since_turn: usize,
    pinned: bool,
}

impl State {
    pub(super) fn new(direction: Direction, move_step: i64, delay: Duration, slope: f64) -> Self {
        Self {
            direction,
            move_step,
            delay,
            past_slope: slope,
            turns: 0,
            since_turn: 0,
            pinned: false,
        }
    }

    pub(super) fn direction(&self) -> Direction {
        self.direction
    }

    pub(super) fn move_step(&self) -> i64 {
        self.move_step
    }

    pub(super) fn delay(&self) -> Duration {
        self.delay
    }

    pub(super) fn turns(&self) -> usize {
        self.turns
    }

    /// Folds in a new slope and decides the next move.
    ///
    /// Only a strict sign change counts as a reversal. A zero slope carries no
    /// sign: it is not a reversal and does not replace the previous slope. A
    /// climb that started on a flat spot takes its direction from the first
    /// nonzero slope instead, and gives up if the next slope is zero as well.
    pub(super) fn advance(&mut self, slope: f64, policy: Policy, slope_step: i64) -> Step {
        if self.past_slope == 0.0 && slope == 0.0 {
            return Step::Flat;
        }
        if self.past_slope == 0.0 {
            self.direction = Direction::of(slope);
        }

        let reversed =
            (self.past_slope > 0.0 && slope < 0.0) || (self.past_slope < 0.0 && slope > 0.0);
        if reversed {
            self.direction = self.direction.reversed();
            self.halve();
            self.turns += 1;
            self.since_turn = 0;
            self.pinned = false;
        }
        if slope != 0.0 {
            self.past_slope = slope;
        }

        let step = match policy {
            Policy::ConfirmTurns => {
                if self.turns == 1 && self.since_turn == 1 {
                    // Slope held after one reversal: the peak is ahead.
                    self.halve();
                    Step::Finish(self.direction.times(self.move_step))
                } else if self.turns == 2 && self.since_turn == 0 {
                    // Reversed twice in a row: the probe overshot the peak.
                    Step::Finish(self.direction.times(self.move_step))
                } else {
                    Step::Move(self.direction.times(self.move_step))
                }
            }
            Policy::StepFloor => {
                // The floor only ends a climb that has bracketed the peak.
                if reversed && self.move_step / 2 < slope_step {
                    Step::Finish(self.direction.times(self.move_step))
                } else {
                    Step::Move(self.direction.times(self.move_step))
                }
            }
        };

        if let Step::Move(_) = step {
            self.since_turn += 1;
        }
        step
    }

    /// Records a move clamped by a calibration bound.
    ///
    /// Returns true if the climb was already pinned since its last reversal.
    pub(super) fn pin(&mut self) -> bool {
        std::mem::replace(&mut self.pinned, true)
    }

    fn halve(&mut self) {
        self.move_step /= 2;
        self.delay /= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE: i64 = 500;

    fn state(direction: Direction, slope: f64) -> State {
        State::new(direction, 8_000, Duration::from_millis(500), slope)
    }

    #[test]
    fn same_sign_keeps_direction_and_step() {
        let mut s = state(Direction::Positive, 1.0);

        let step = s.advance(0.5, Policy::ConfirmTurns, PROBE);

        assert_eq!(step, Step::Move(8_000));
        assert_eq!(s.turns(), 0);
        assert_eq!(s.delay(), Duration::from_millis(500));
    }

    #[test]
    fn reversal_flips_and_halves() {
        let mut s = state(Direction::Positive, 1.0);

        let step = s.advance(-0.5, Policy::ConfirmTurns, PROBE);

        assert_eq!(step, Step::Move(-4_000));
        assert_eq!(s.direction(), Direction::Negative);
        assert_eq!(s.move_step(), 4_000);
        assert_eq!(s.delay(), Duration::from_millis(250));
        assert_eq!(s.turns(), 1);
    }

    #[test]
    fn zero_slope_keeps_previous_sign() {
        let mut s = state(Direction::Positive, 1.0);
        assert_eq!(s.advance(0.0, Policy::ConfirmTurns, PROBE), Step::Move(8_000));
        assert_eq!(s.turns(), 0);

        assert_eq!(s.advance(-1.0, Policy::ConfirmTurns, PROBE), Step::Move(-4_000));
        assert_eq!(s.turns(), 1);
    }

    #[test]
    fn flat_start_adopts_first_nonzero_slope() {
        let mut s = state(Direction::Negative, 0.0);

        let step = s.advance(2.0, Policy::ConfirmTurns, PROBE);

        assert_eq!(step, Step::Move(8_000));
        assert_eq!(s.direction(), Direction::Positive);
        assert_eq!(s.turns(), 0);
    }

    #[test]
    fn second_flat_slope_gives_up() {
        let mut s = state(Direction::Negative, 0.0);

        assert_eq!(s.advance(0.0, Policy::StepFloor, PROBE), Step::Flat);
        assert_eq!(s.advance(0.0, Policy::ConfirmTurns, PROBE), Step::Flat);
        assert_eq!(s.move_step(), 8_000);
        assert_eq!(s.turns(), 0);
    }

    #[test]
    fn confirm_turns_finishes_when_slope_holds() {
        let mut s = state(Direction::Positive, 1.0);
        assert_eq!(s.advance(-1.0, Policy::ConfirmTurns, PROBE), Step::Move(-4_000));

        let step = s.advance(-1.0, Policy::ConfirmTurns, PROBE);

        assert_eq!(step, Step::Finish(-2_000));
        assert_eq!(s.move_step(), 2_000);
        assert_eq!(s.delay(), Duration::from_millis(125));
    }

    #[test]
    fn confirm_turns_finishes_on_immediate_second_reversal() {
        let mut s = state(Direction::Positive, 1.0);
        assert_eq!(s.advance(-1.0, Policy::ConfirmTurns, PROBE), Step::Move(-4_000));

        let step = s.advance(1.0, Policy::ConfirmTurns, PROBE);

        assert_eq!(step, Step::Finish(2_000));
        assert_eq!(s.turns(), 2);
    }

    #[test]
    fn reversal_decisions_mirror() {
        let mut up = state(Direction::Positive, 1.0);
        let mut down = state(Direction::Negative, -1.0);

        for (a, b) in [(-1.0, 1.0), (1.0, -1.0)] {
            let up_step = up.advance(a, Policy::ConfirmTurns, PROBE);
            let down_step = down.advance(b, Policy::ConfirmTurns, PROBE);
            match (up_step, down_step) {
                (Step::Move(u), Step::Move(d)) | (Step::Finish(u), Step::Finish(d)) => {
                    assert_eq!(u, -d);
                }
                other => panic!("decisions diverged: {other:?}"),
            }
            assert_eq!(up.direction(), down.direction().reversed());
        }
    }

    #[test]
    fn step_floor_halves_until_below_probe() {
        let mut s = state(Direction::Positive, 1.0);
        let policy = Policy::StepFloor;

        assert_eq!(s.advance(-1.0, policy, PROBE), Step::Move(-4_000));
        assert_eq!(s.advance(1.0, policy, PROBE), Step::Move(2_000));
        assert_eq!(s.advance(1.0, policy, PROBE), Step::Move(2_000));
        assert_eq!(s.advance(-1.0, policy, PROBE), Step::Move(-1_000));
        assert_eq!(s.advance(1.0, policy, PROBE), Step::Finish(500));
        assert_eq!(s.turns(), 4);
    }

    #[test]
    fn pin_reports_second_clamp() {
        let mut s = state(Direction::Positive, 1.0);
        assert!(!s.pin());
        assert!(s.pin());

        s.advance(-1.0, Policy::StepFloor, PROBE);
        assert!(!s.pin());
    }
}
