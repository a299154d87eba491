//! Compass wind resolution.
//!
//! A compass token resolves to a grid vector `(row delta, col delta)` naming
//! the bearing the wind blows *from*. Row increases to the south and column
//! increases to the east:
//!
//! ```text
//! N:(-1,0)  S:(1,0)  E:(0,1)  W:(0,-1)
//! NE:(-1,1) NW:(-1,-1) SE:(1,1) SW:(1,-1)
//! ```
//!
//! Fire is pushed downwind, along the negated bearing: a northerly drives
//! the front south. An unrecognized token resolves to the zero vector, which
//! silently disables directional bias.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight compass points
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    /// All eight directions, clockwise from north
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Parse a compass token, ignoring case and surrounding whitespace
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.token().eq_ignore_ascii_case(token))
    }

    /// Canonical upper-case token
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }

    /// Grid offset `(row delta, col delta)` of this bearing
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::N => (-1, 0),
            Self::S => (1, 0),
            Self::E => (0, 1),
            Self::W => (0, -1),
            Self::NE => (-1, 1),
            Self::NW => (-1, -1),
            Self::SE => (1, 1),
            Self::SW => (1, -1),
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolved wind for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindModel {
    direction: Option<CompassDirection>,
    bearing: Vector2<f64>,
    magnitude: f64,
}

impl WindModel {
    /// Resolve a direction token to its bearing vector.
    ///
    /// Returns the zero vector and `false` for an unrecognized token.
    #[must_use]
    pub fn resolve_direction(token: &str) -> (Vector2<f64>, bool) {
        match CompassDirection::parse(token) {
            Some(direction) => {
                let (dr, dc) = direction.offset();
                (Vector2::new(f64::from(dr), f64::from(dc)), true)
            }
            None => (Vector2::zeros(), false),
        }
    }

    /// Resolve token and speed into a wind model.
    ///
    /// `magnitude = speed_mph / speed_scale`. Speed is not clamped, so a
    /// negative speed yields a negative magnitude.
    #[must_use]
    pub fn resolve(token: &str, speed_mph: f64, speed_scale: f64) -> Self {
        let (bearing, _) = Self::resolve_direction(token);
        Self {
            direction: CompassDirection::parse(token),
            bearing,
            magnitude: speed_mph / speed_scale,
        }
    }

    /// No wind at all
    #[must_use]
    pub fn calm() -> Self {
        Self {
            direction: None,
            bearing: Vector2::zeros(),
            magnitude: 0.0,
        }
    }

    /// Whether the token resolved to a compass direction
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.direction.is_some()
    }

    /// Resolved compass direction, if any
    #[must_use]
    pub fn direction(&self) -> Option<CompassDirection> {
        self.direction
    }

    /// Bearing vector the wind blows from
    #[must_use]
    pub fn bearing(&self) -> Vector2<f64> {
        self.bearing
    }

    /// Vector the fire is pushed along
    #[must_use]
    pub fn downwind(&self) -> Vector2<f64> {
        -self.bearing
    }

    /// Scalar wind magnitude
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Alignment of a neighbor offset with the downwind vector.
    ///
    /// `dot(downwind, offset) / |offset|`; positive when spreading with the
    /// wind, negative against it. Zero for the zero offset.
    #[must_use]
    pub fn alignment(&self, dr: i32, dc: i32) -> f64 {
        let offset = Vector2::new(f64::from(dr), f64::from(dc));
        let distance = offset.norm();
        if distance == 0.0 {
            return 0.0;
        }
        self.downwind().dot(&offset) / distance
    }

    /// Spread multiplier for a neighbor offset.
    ///
    /// `1 + alignment * magnitude * gain` for positive alignment, otherwise
    /// exactly `1.0`: spreading against the wind gets no boost and no penalty.
    #[must_use]
    pub fn boost(&self, dr: i32, dc: i32, gain: f64) -> f64 {
        let alignment = self.alignment(dr, dc);
        if alignment > 0.0 {
            1.0 + alignment * self.magnitude * gain
        } else {
            1.0
        }
    }
}
