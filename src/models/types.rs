//! Common domain type definitions

use std::fmt;

use serde::{Serialize, Serializer};

/// Work location of an employee
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// Works at headquarters
    Headquarters,
    /// Works remotely
    Remote,
    /// Any other label found in the source, kept verbatim
    Other(String),
}

impl From<&str> for Location {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "headquarters" | "hq" => Self::Headquarters,
            "remote" => Self::Remote,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl Location {
    /// Label used in metric output
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Headquarters => "Headquarters",
            Self::Remote => "Remote",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Decade-wide age class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBucket {
    /// Younger than 20, only produced by the explicit policy
    Under20,
    /// 20 to 29
    Twenties,
    /// 30 to 39
    Thirties,
    /// 40 to 49
    Forties,
    /// 50 to 59, also the fallthrough bucket of the source policy
    Fifties,
    /// 60 and older, only produced by the explicit policy
    SixtyPlus,
}

impl AgeBucket {
    /// Label used in metric output
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Under20 => "under 20",
            Self::Twenties => "20-29",
            Self::Thirties => "30-39",
            Self::Forties => "40-49",
            Self::Fifties => "50-59",
            Self::SixtyPlus => "60+",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
