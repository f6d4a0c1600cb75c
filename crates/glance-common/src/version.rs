//! Version types for schema compatibility.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GlanceError;

/// Schema version using semantic versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version (breaking changes)
    pub major: u16,
    /// Minor version (backwards-compatible additions)
    pub minor: u16,
    /// Patch version (bug fixes)
    pub patch: u16,
}

impl SchemaVersion {
    /// Creates a new schema version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Current interaction data asset file version.
    pub const INTERACTION_ASSET: Self = Self::new(1, 0, 0);

    /// Current NPC interaction data asset file version.
    pub const NPC_ASSET: Self = Self::new(1, 0, 0);

    /// Current input script version.
    pub const INPUT_SCRIPT: Self = Self::new(1, 0, 0);

    /// Checks if this version is compatible with another version.
    /// Compatible means same major version and this minor >= other minor.
    #[must_use]
    pub const fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major && self.minor >= other.minor
    }

    /// Checks that data written with `data_version` can be read by this version.
    pub fn check_readable(&self, data_version: &Self) -> Result<(), GlanceError> {
        if self.is_compatible_with(data_version) {
            Ok(())
        } else {
            Err(GlanceError::VersionMismatch {
                expected: self.to_string(),
                actual: data_version.to_string(),
            })
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = GlanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u16, GlanceError> {
            match parts.next() {
                Some(part) => part
                    .parse()
                    .map_err(|_| GlanceError::InvalidVersion(s.to_string())),
                None => Ok(0),
            }
        };

        let major = next()?;
        let minor = next()?;
        let patch = next()?;

        if parts.next().is_some() {
            return Err(GlanceError::InvalidVersion(s.to_string()));
        }

        Ok(Self::new(major, minor, patch))
    }
}
