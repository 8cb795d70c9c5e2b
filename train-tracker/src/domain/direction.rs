//! Direction of travel.

use std::fmt;

/// Error returned when parsing an unknown direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction: {0:?}")]
pub struct InvalidDirection(String);

/// Direction of travel along a segment, relative to its canonical
/// north/south orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
}

impl Direction {
    /// Parse a direction as the feed reports it (`"North"`, `"South"`),
    /// also accepting the single-letter form used in query parameters.
    pub fn parse(s: &str) -> Result<Self, InvalidDirection> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            _ => Err(InvalidDirection(s.to_string())),
        }
    }

    /// The single-letter code the feed accepts as a filter.
    pub fn code(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::South => "s",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => f.write_str("North"),
            Direction::South => f.write_str("South"),
        }
    }
}
