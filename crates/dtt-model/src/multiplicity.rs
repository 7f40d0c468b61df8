//! Value multiplicity ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Allowed repeat count of an attribute value, as written in the data
/// dictionary (`1`, `1-3`, `1-n`, `2-2n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplicity {
    pub min: u32,
    /// Upper bound; `None` means unbounded.
    pub max: Option<u32>,
    pub step: u32,
}

impl Multiplicity {
    /// Exactly one value.
    pub const ONE: Multiplicity = Multiplicity {
        min: 1,
        max: Some(1),
        step: 1,
    };

    /// One or more values.
    pub const ONE_TO_MANY: Multiplicity = Multiplicity {
        min: 1,
        max: None,
        step: 1,
    };

    /// True when more than one value may be stored.
    #[must_use]
    pub const fn allows_multiple(&self) -> bool {
        match self.max {
            Some(max) => max > 1,
            None => true,
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}-{}", self.min, max),
            None if self.step > 1 => write!(f, "{}-{}n", self.min, self.step),
            None => write!(f, "{}-n", self.min),
        }
    }
}

impl FromStr for Multiplicity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ModelError::InvalidMultiplicity {
            text: s.to_string(),
        };
        let text = s.trim();

        let Some((min, max)) = text.split_once('-') else {
            let count = text.parse().map_err(|_| invalid())?;
            return Ok(Self {
                min: count,
                max: Some(count),
                step: 1,
            });
        };

        let min: u32 = min.trim().parse().map_err(|_| invalid())?;
        let max = max.trim();
        if let Some(step) = max.strip_suffix(['n', 'N']) {
            let step = if step.is_empty() {
                1
            } else {
                step.parse().map_err(|_| invalid())?
            };
            return Ok(Self {
                min,
                max: None,
                step,
            });
        }

        let max: u32 = max.parse().map_err(|_| invalid())?;
        if max < min {
            return Err(invalid());
        }
        Ok(Self {
            min,
            max: Some(max),
            step: 1,
        })
    }
}
