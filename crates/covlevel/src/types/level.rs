use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An ordinal coverage tier assigned to a data path.
///
/// Lower levels are more essential. `Comprehensive` is the catch-all tier
/// returned when no rule matches; `Undetermined` is reserved for an absent
/// path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    Undetermined,
    Core,
    Basic,
    Moderate,
    Modern,
    Comprehensive,
}

impl CoverageLevel {
    /// Every level, lowest first.
    pub const ALL: [CoverageLevel; 6] = [
        CoverageLevel::Undetermined,
        CoverageLevel::Core,
        CoverageLevel::Basic,
        CoverageLevel::Moderate,
        CoverageLevel::Modern,
        CoverageLevel::Comprehensive,
    ];

    /// Names accepted by `from_str`, used for typo suggestions.
    pub const NAMES: [&'static str; 6] =
        ["undetermined", "core", "basic", "moderate", "modern", "comprehensive"];

    /// The numeric value used in rule files and reports.
    pub fn value(self) -> u8 {
        match self {
            CoverageLevel::Undetermined => 0,
            CoverageLevel::Core => 10,
            CoverageLevel::Basic => 40,
            CoverageLevel::Moderate => 60,
            CoverageLevel::Modern => 80,
            CoverageLevel::Comprehensive => 100,
        }
    }

    /// Look up a level by its exact numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.value() == value)
    }

    /// The lowercase name of this level.
    pub fn name(self) -> &'static str {
        match self {
            CoverageLevel::Undetermined => "undetermined",
            CoverageLevel::Core => "core",
            CoverageLevel::Basic => "basic",
            CoverageLevel::Moderate => "moderate",
            CoverageLevel::Modern => "modern",
            CoverageLevel::Comprehensive => "comprehensive",
        }
    }
}

impl Display for CoverageLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A level string that is neither a known name nor a known numeric value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown coverage level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for CoverageLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return CoverageLevel::from_value(value).ok_or_else(|| UnknownLevel(s.to_string()));
        }
        CoverageLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}
