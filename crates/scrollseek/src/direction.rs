//! Scroll directions.
//!
//! A [`PhysicalDirection`] names where the viewport moves: scrolling
//! [`PhysicalDirection::Down`] reveals content further down the list. An
//! [`Axis`] owns the ordered directions tried when the caller does not pick
//! one, and a [`DirectionConverter`] maps layout-relative
//! [`LogicalDirection`]s onto physical ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalDirection {
    /// Reveal content above
    Up,
    /// Reveal content below
    Down,
    /// Reveal content to the left
    Left,
    /// Reveal content to the right
    Right,
}

impl PhysicalDirection {
    /// Axis this direction moves along
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// The reverse direction
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// True for directions that move towards the end of natural reading order
    #[must_use]
    pub const fn is_forward(self) -> bool {
        matches!(self, Self::Down | Self::Right)
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for PhysicalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical scroll dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Left/right
    Horizontal,
    /// Up/down
    #[default]
    Vertical,
}

impl Axis {
    /// Directions to try, in order, when none is specified
    #[must_use]
    pub const fn physical_directions(self) -> &'static [PhysicalDirection] {
        match self {
            Self::Vertical => &[PhysicalDirection::Down, PhysicalDirection::Up],
            Self::Horizontal => &[PhysicalDirection::Right, PhysicalDirection::Left],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

/// Layout-relative direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalDirection {
    /// Towards later items
    Forward,
    /// Towards earlier items
    Backward,
}

/// Maps logical directions onto physical ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionConverter {
    /// Forward is down / right
    #[default]
    Standard,
    /// Forward is up / left (reversed or right-to-left layouts)
    Reversed,
}

impl DirectionConverter {
    /// Physical direction for `logical` along `axis`
    #[must_use]
    pub const fn to_physical(self, axis: Axis, logical: LogicalDirection) -> PhysicalDirection {
        let forward = matches!(logical, LogicalDirection::Forward);
        let towards_end = match self {
            Self::Standard => forward,
            Self::Reversed => !forward,
        };
        match (axis, towards_end) {
            (Axis::Vertical, true) => PhysicalDirection::Down,
            (Axis::Vertical, false) => PhysicalDirection::Up,
            (Axis::Horizontal, true) => PhysicalDirection::Right,
            (Axis::Horizontal, false) => PhysicalDirection::Left,
        }
    }

    /// Logical direction of `physical`
    #[must_use]
    pub const fn to_logical(self, physical: PhysicalDirection) -> LogicalDirection {
        match (self, physical.is_forward()) {
            (Self::Standard, true) | (Self::Reversed, false) => LogicalDirection::Forward,
            _ => LogicalDirection::Backward,
        }
    }
}
