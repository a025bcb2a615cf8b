use std::{cell::RefCell, collections::HashMap, rc::Rc};

use focus_core::{Actuator, DeviceStore, ImageSource, Position, keys};
use thiserror::Error;

/// Errors raised by the simulated devices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("no value stored for key `{0}`")]
    MissingKey(String),

    #[error("motor fault after {0} moves")]
    MotorFault(usize),
}

/// A move command received by the simulated motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Relative(i64),
    Absolute(Position),
}

type Curve = Box<dyn Fn(Position) -> f64>;

struct Lens {
    curve: Curve,
    position: Position,
    empty_frames: usize,
    captures: usize,
    sampled: Vec<Position>,
    moves: Vec<Move>,
    jam_after: Option<usize>,
    fault_after: Option<usize>,
    config: HashMap<String, i64>,
}

/// A simulated focus axis.
///
/// Cloning a rig shares the same lens.
#[derive(Clone)]
pub struct Rig {
    lens: Rc<RefCell<Lens>>,
}

impl Rig {
    /// Creates a rig with the lens at `start` and contrast given by `curve`.
    ///
    /// The store reports `start` as `af_base`, and the live lens position as
    /// `af_curr` unless it is overridden.
    pub fn new<C>(curve: C, start: Position) -> Self
    where
        C: Fn(Position) -> f64 + 'static,
    {
        let config = HashMap::from([(keys::AF_BASE.to_owned(), start)]);
        let lens = Lens {
            curve: Box::new(curve),
            position: start,
            empty_frames: 0,
            captures: 0,
            sampled: Vec::new(),
            moves: Vec::new(),
            jam_after: None,
            fault_after: None,
            config,
        };
        Self {
            lens: Rc::new(RefCell::new(lens)),
        }
    }

    /// Makes the next `count` captures come back empty.
    #[must_use]
    pub fn with_empty_frames(self, count: usize) -> Self {
        self.lens.borrow_mut().empty_frames = count;
        self
    }

    /// Stops the lens from moving after `moves` commands.
    ///
    /// Later commands are still recorded but have no effect on the position.
    #[must_use]
    pub fn with_jam_after(self, moves: usize) -> Self {
        self.lens.borrow_mut().jam_after = Some(moves);
        self
    }

    /// Makes the motor return an error for every command after `moves`.
    #[must_use]
    pub fn with_fault_after(self, moves: usize) -> Self {
        self.lens.borrow_mut().fault_after = Some(moves);
        self
    }

    /// Stores a configuration value.
    #[must_use]
    pub fn with_config(self, key: &str, value: i64) -> Self {
        self.lens
            .borrow_mut()
            .config
            .insert(key.to_owned(), value);
        self
    }

    /// Returns the three devices, all sharing this rig's lens.
    #[must_use]
    pub fn parts(&self) -> (Camera, Motor, Store) {
        (
            Camera {
                lens: Rc::clone(&self.lens),
            },
            Motor {
                lens: Rc::clone(&self.lens),
            },
            Store {
                lens: Rc::clone(&self.lens),
            },
        )
    }

    /// Returns the true lens position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.lens.borrow().position
    }

    /// Returns every move command received, in order.
    #[must_use]
    pub fn moves(&self) -> Vec<Move> {
        self.lens.borrow().moves.clone()
    }

    /// Returns the sum of all relative move commands.
    #[must_use]
    pub fn net_displacement(&self) -> i64 {
        self.lens
            .borrow()
            .moves
            .iter()
            .map(|m| match m {
                Move::Relative(delta) => *delta,
                Move::Absolute(_) => 0,
            })
            .sum()
    }

    /// Returns the number of capture attempts, including empty ones.
    #[must_use]
    pub fn captures(&self) -> usize {
        self.lens.borrow().captures
    }

    /// Returns the lens position at every successful capture, in order.
    #[must_use]
    pub fn sampled_positions(&self) -> Vec<Position> {
        self.lens.borrow().sampled.clone()
    }
}

/// Simulated camera. A frame is the lens position at capture time.
pub struct Camera {
    lens: Rc<RefCell<Lens>>,
}

impl ImageSource for Camera {
    type Frame = Position;
    type Error = SimError;

    fn capture_frame(&mut self) -> Result<Option<Position>, SimError> {
        let mut lens = self.lens.borrow_mut();
        lens.captures += 1;
        if lens.empty_frames > 0 {
            lens.empty_frames -= 1;
            return Ok(None);
        }
        let position = lens.position;
        lens.sampled.push(position);
        Ok(Some(position))
    }

    fn extract_contrast(&self, frame: &Position) -> f64 {
        (self.lens.borrow().curve)(*frame)
    }
}

/// Simulated focus motor.
pub struct Motor {
    lens: Rc<RefCell<Lens>>,
}

impl Motor {
    fn command(&mut self, command: Move) -> Result<(), SimError> {
        let mut lens = self.lens.borrow_mut();
        let issued = lens.moves.len();
        if lens.fault_after.is_some_and(|n| issued >= n) {
            return Err(SimError::MotorFault(issued));
        }
        lens.moves.push(command);
        if lens.jam_after.is_some_and(|n| issued >= n) {
            log::trace!("motor jammed, ignoring {command:?}");
            return Ok(());
        }
        lens.position = match command {
            Move::Relative(delta) => lens.position + delta,
            Move::Absolute(position) => position,
        };
        Ok(())
    }
}

impl Actuator for Motor {
    type Error = SimError;

    fn move_relative(&mut self, delta: i64) -> Result<(), SimError> {
        self.command(Move::Relative(delta))
    }

    fn move_absolute(&mut self, position: Position) -> Result<(), SimError> {
        self.command(Move::Absolute(position))
    }
}

/// Simulated position readback and calibration store.
pub struct Store {
    lens: Rc<RefCell<Lens>>,
}

impl DeviceStore for Store {
    type Error = SimError;

    fn read_current_position(&self) -> Result<Position, SimError> {
        Ok(self.lens.borrow().position)
    }

    fn read_config(&self, key: &str) -> Result<i64, SimError> {
        let lens = self.lens.borrow();
        match lens.config.get(key) {
            Some(value) => Ok(*value),
            None if key == keys::AF_CURR => Ok(lens.position),
            None => Err(SimError::MissingKey(key.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use focus_core::SearchRange;
    use focus_search::{Bounds, Config, Session, Timing, sweep};

    use super::*;
    use crate::curves;

    #[test]
    fn parts_share_one_lens() {
        let rig = Rig::new(curves::linear(1.0), 100);
        let (mut camera, mut motor, store) = rig.parts();

        motor.move_relative(50).expect("move");
        motor.move_absolute(10).expect("move");
        motor.move_relative(-5).expect("move");

        assert_eq!(rig.position(), 5);
        assert_eq!(store.read_current_position(), Ok(5));
        let frame = camera.capture_frame().expect("capture").expect("frame");
        assert_relative_eq!(camera.extract_contrast(&frame), 5.0);
        assert_eq!(rig.net_displacement(), 45);
        assert_eq!(
            rig.moves(),
            vec![Move::Relative(50), Move::Absolute(10), Move::Relative(-5)]
        );
    }

    #[test]
    fn empty_frames_come_first() {
        let rig = Rig::new(curves::flat(1.0), 0).with_empty_frames(2);
        let (mut camera, _, _) = rig.parts();

        assert_eq!(camera.capture_frame(), Ok(None));
        assert_eq!(camera.capture_frame(), Ok(None));
        assert_eq!(camera.capture_frame(), Ok(Some(0)));
        assert_eq!(rig.captures(), 3);
        assert_eq!(rig.sampled_positions(), vec![0]);
    }

    #[test]
    fn jammed_motor_records_but_does_not_move() {
        let rig = Rig::new(curves::flat(1.0), 0).with_jam_after(1);
        let (_, mut motor, _) = rig.parts();

        motor.move_relative(10).expect("move");
        motor.move_relative(10).expect("move");

        assert_eq!(rig.position(), 10);
        assert_eq!(rig.moves().len(), 2);
    }

    #[test]
    fn faulty_motor_errors() {
        let rig = Rig::new(curves::flat(1.0), 0).with_fault_after(1);
        let (_, mut motor, _) = rig.parts();

        assert!(motor.move_relative(10).is_ok());
        assert_eq!(motor.move_relative(10), Err(SimError::MotorFault(1)));
        assert_eq!(rig.position(), 10);
    }

    #[test]
    fn current_position_key_follows_lens() {
        let rig = Rig::new(curves::flat(1.0), 700);
        let (_, mut motor, store) = rig.parts();

        motor.move_relative(-200).expect("move");

        assert_eq!(store.read_config(keys::AF_CURR), Ok(500));
        assert_eq!(store.read_config(keys::AF_BASE), Ok(700));
    }

    #[test]
    fn store_reads_seeded_and_missing_keys() {
        let rig = Rig::new(curves::flat(1.0), 700).with_config(keys::AF_MIN, 100);
        let (_, _, store) = rig.parts();

        assert_eq!(store.read_config(keys::AF_BASE), Ok(700));
        assert_eq!(store.read_config(keys::AF_CURR), Ok(700));
        assert_eq!(store.read_config(keys::AF_MIN), Ok(100));
        assert_eq!(
            store.read_config(keys::AF_MAX),
            Err(SimError::MissingKey("af_max".to_owned()))
        );
    }

    #[test]
    fn devices_can_be_lent_to_a_session() {
        let rig = Rig::new(curves::parabola(300, 1.0), 0);
        let (mut camera, mut motor, store) = rig.parts();
        let config = Config::new(Bounds::new(0, 1_000).expect("bounds"), 100)
            .and_then(|c| c.with_timing(Timing::immediate()))
            .expect("config");
        let range = SearchRange::new(0, 500, 100).expect("range");

        let session = Session::new(&mut camera, &mut motor, &store, config);
        let solution = sweep::search_unobserved(session, &range).expect("sweep");

        assert_eq!(solution.position, 300);
        motor.move_relative(-300).expect("move");
        assert_eq!(store.read_current_position(), Ok(0));
    }
}
