/// Direction of travel along the focus axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Toward lower positions (`-1`).
    Negative,

    /// Toward higher positions (`+1`).
    Positive,
}

impl Direction {
    /// Returns the direction in which `value` increases.
    ///
    /// Strictly positive values map to [`Direction::Positive`]; zero, negative,
    /// and NaN values map to [`Direction::Negative`].
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// Returns the direction from `from` toward `to`.
    ///
    /// Returns `None` when the two positions are equal.
    #[must_use]
    pub fn between(from: i64, to: i64) -> Option<Self> {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Some(Self::Positive),
            std::cmp::Ordering::Less => Some(Self::Negative),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Returns `-1` or `+1`.
    #[must_use]
    pub fn sign(self) -> i64 {
        match self {
            Self::Negative => -1,
            Self::Positive => 1,
        }
    }

    /// Returns the opposite direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Positive => Self::Negative,
        }
    }

    /// Scales a step magnitude into a signed displacement.
    #[must_use]
    pub fn times(self, magnitude: i64) -> i64 {
        self.sign() * magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_treats_zero_as_negative() {
        assert_eq!(Direction::of(0.25), Direction::Positive);
        assert_eq!(Direction::of(-0.25), Direction::Negative);
        assert_eq!(Direction::of(0.0), Direction::Negative);
        assert_eq!(Direction::of(f64::NAN), Direction::Negative);
    }

    #[test]
    fn between_orders_positions() {
        assert_eq!(Direction::between(1000, 0), Some(Direction::Negative));
        assert_eq!(Direction::between(0, 1000), Some(Direction::Positive));
        assert_eq!(Direction::between(5, 5), None);
    }

    #[test]
    fn reversed_and_times() {
        let dir = Direction::Positive;
        assert_eq!(dir.reversed(), Direction::Negative);
        assert_eq!(dir.reversed().reversed(), dir);
        assert_eq!(dir.times(500), 500);
        assert_eq!(dir.reversed().times(500), -500);
    }
}
