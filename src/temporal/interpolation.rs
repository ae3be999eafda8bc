use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

/// Enum representing the different types of interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TInterpolation {
    None,
    Discrete,
    Stepwise,
    Linear,
}

impl TInterpolation {
    /// Whether values exist between the listed instants.
    pub fn is_continuous(&self) -> bool {
        matches!(self, TInterpolation::Stepwise | TInterpolation::Linear)
    }
}

impl FromStr for TInterpolation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TInterpolation::None),
            "discrete" => Ok(TInterpolation::Discrete),
            "linear" => Ok(TInterpolation::Linear),
            "stepwise" | "step" => Ok(TInterpolation::Stepwise),
            _ => Err(ParseError::new(s, "unknown interpolation")),
        }
    }
}

impl fmt::Display for TInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TInterpolation::None => write!(f, "None"),
            TInterpolation::Discrete => write!(f, "Discrete"),
            TInterpolation::Stepwise => write!(f, "Step"),
            TInterpolation::Linear => write!(f, "Linear"),
        }
    }
}
