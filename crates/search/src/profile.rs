//! The two autofocus passes of a capture workflow.
//!
//! A pupil pass runs first from the stored base position with a hill climb.
//! A retina pass then sweeps below the current position to refine focus where
//! the contrast landscape may have several maxima. Both scan toward lower
//! positions.

use focus_core::{Actuator, DeviceStore, ImageSource, RangeError, SearchRange, keys};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Session, Solution, Strategy, StrategyKind, hill_climb::Policy};

/// Store key a profile reads its starting position from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Anchor {
    /// The calibrated base position, `af_base`.
    Base,

    /// The current focus position, `af_curr`.
    Current,
}

impl Anchor {
    /// Returns the store key for this anchor.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Base => keys::AF_BASE,
            Self::Current => keys::AF_CURR,
        }
    }
}

/// A named search: where it starts, how far it scans, and which strategy runs.
///
/// The range runs from the anchor position down to `anchor - scan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profile {
    pub anchor: Anchor,
    pub scan: i64,
    pub step: i64,
    pub strategy: StrategyKind,
}

impl Profile {
    /// Hill climb from `af_base` with the turn-confirming policy.
    #[must_use]
    pub fn pupil(scan: i64, step: i64) -> Self {
        Self {
            anchor: Anchor::Base,
            scan,
            step,
            strategy: StrategyKind::HillClimb {
                policy: Policy::ConfirmTurns,
            },
        }
    }

    /// Sweep down from `af_curr`.
    #[must_use]
    pub fn retina(scan: i64, step: i64) -> Self {
        Self {
            anchor: Anchor::Current,
            scan,
            step,
            strategy: StrategyKind::Sweep,
        }
    }

    /// Parses a profile from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid profile.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads the anchor position and runs the profile's strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the anchor cannot be read,
    /// [`Error::InvalidRange`] if the scan and step do not form a valid range,
    /// or the error that ended the search.
    pub fn run<I, A, S>(&self, session: Session<I, A, S>) -> Result<Solution, Error>
    where
        I: ImageSource,
        A: Actuator,
        S: DeviceStore,
    {
        let anchor = session.read_config(self.anchor.key())?;
        let end = anchor.checked_sub(self.scan).ok_or(RangeError::Overflow)?;
        let range = SearchRange::new(anchor, end, self.step)?;
        log::info!(
            "running {:?} from {} ({anchor}) over {}..={} by {}",
            self.strategy,
            self.anchor.key(),
            range.start(),
            range.end(),
            self.step
        );
        self.strategy.run(session, &range)
    }
}

/// Coarse focus on the pupil: hill climb from `af_base` toward `af_base - scan`.
///
/// # Errors
///
/// Returns the same errors as [`Profile::run`].
pub fn pupil_autofocus<I, A, S>(
    session: Session<I, A, S>,
    scan: i64,
    step: i64,
) -> Result<Solution, Error>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    Profile::pupil(scan, step).run(session)
}

/// Fine focus on the retina: sweep from `af_curr` to `af_curr - scan`.
///
/// # Errors
///
/// Returns the same errors as [`Profile::run`].
pub fn retina_autofocus<I, A, S>(
    session: Session<I, A, S>,
    scan: i64,
    step: i64,
) -> Result<Solution, Error>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    Profile::retina(scan, step).run(session)
}

#[cfg(test)]
mod tests {
    use focus_sim::{Camera, Motor, Rig, Store, curves};

    use super::*;
    use crate::{Config, Status, Timing};

    fn session(rig: &Rig) -> Session<Camera, Motor, Store> {
        let config = Config::default()
            .with_timing(Timing::immediate())
            .and_then(|c| c.with_metric_scale(1.0))
            .expect("config");
        let (camera, motor, store) = rig.parts();
        Session::new(camera, motor, store, config)
    }

    #[test]
    fn pupil_climbs_from_base() {
        let rig = Rig::new(curves::parabola(52_300, 1.0), 50_000);

        let solution = pupil_autofocus(session(&rig), 4_000, 4_000).expect("should converge");

        assert_eq!(solution.status, Status::Converged);
        assert_eq!(solution.position, 52_000);
    }

    #[test]
    fn retina_sweeps_below_current() {
        let rig = Rig::new(curves::parabola(49_300, 1.0), 50_000);

        let solution = retina_autofocus(session(&rig), 2_000, 250).expect("should converge");

        assert_eq!(solution.position, 49_250);
        assert_eq!(rig.sampled_positions().first(), Some(&50_000));
        assert_eq!(rig.sampled_positions().last(), Some(&48_000));
    }

    #[test]
    fn pupil_then_retina() {
        let rig = Rig::new(curves::parabola(53_200, 1.0), 50_000);

        let coarse = pupil_autofocus(session(&rig), 4_000, 4_000).expect("pupil");
        let fine = retina_autofocus(session(&rig), 1_000, 100).expect("retina");

        assert_eq!(coarse.position, 54_000);
        assert_eq!(fine.position, 53_200);
    }

    #[test]
    fn zero_step_fails_without_moving() {
        let rig = Rig::new(curves::parabola(52_300, 1.0), 50_000);

        let err = pupil_autofocus(session(&rig), 4_000, 0).expect_err("zero step");

        assert!(matches!(err, Error::InvalidRange(RangeError::ZeroStep)));
        assert!(rig.moves().is_empty());
    }

    #[test]
    fn scan_past_position_range_is_rejected() {
        let rig = Rig::new(curves::parabola(52_300, 1.0), 50_000);

        let err = pupil_autofocus(session(&rig), i64::MIN, 4_000).expect_err("overflow");

        assert!(matches!(err, Error::InvalidRange(RangeError::Overflow)));
        assert!(rig.moves().is_empty());
    }

    #[test]
    fn unreadable_key_is_a_store_error() {
        let rig = Rig::new(curves::flat(0.0), 50_000);

        let err = session(&rig).read_config(keys::AF_MIN).expect_err("missing key");

        assert!(matches!(err, Error::Store(_)));
        assert_eq!(err.to_string(), "device store failed");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn profile_from_toml() {
        let profile = Profile::from_toml_str(
            r#"
            anchor = "current"
            scan = 2000
            step = 250
            strategy = { kind = "sweep" }
            "#,
        )
        .expect("valid profile");
        assert_eq!(profile, Profile::retina(2_000, 250));

        let climb = Profile::from_toml_str(
            r#"
            anchor = "base"
            scan = 4000
            step = 4000

            [strategy]
            kind = "hill_climb"
            policy = "step_floor"
            "#,
        )
        .expect("valid profile");
        assert_eq!(
            climb.strategy,
            StrategyKind::HillClimb {
                policy: Policy::StepFloor
            }
        );
    }
}
