//! Resolution scale of an asset set

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Integer magnification of the HD assets relative to the reference dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scale {
    /// Double resolution (`x2` archives)
    X2,
    /// Triple resolution (`x3` archives)
    X3,
}

/// Scale value outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported scale '{0}': expected 2 or 3")]
pub struct InvalidScale(pub String);

impl Scale {
    /// All scales in processing order
    pub const ALL: [Self; 2] = [Self::X2, Self::X3];

    /// Multiplication factor applied to reference coordinates
    pub const fn factor(self) -> u32 {
        match self {
            Self::X2 => 2,
            Self::X3 => 3,
        }
    }

    /// Marker that archive file names carry for this scale, e.g. `x2`
    pub fn archive_marker(self) -> String {
        format!("x{}", self.factor())
    }
}

impl TryFrom<u32> for Scale {
    type Error = InvalidScale;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::X2),
            3 => Ok(Self::X3),
            other => Err(InvalidScale(other.to_string())),
        }
    }
}

impl FromStr for Scale {
    type Err = InvalidScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['x', 'X']);
        trimmed
            .parse::<u32>()
            .map_err(|_| InvalidScale(s.to_string()))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.factor())
    }
}
