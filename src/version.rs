//! Release version parsing and the minor-version bump.
//!
//! Tags are not required to be strict semver: only the minor component is
//! interpreted. The major component is carried over verbatim (so a `v`
//! prefix survives) and the patch component is replaced by `0`.
use std::{fmt, str::FromStr};

use crate::error::ToolError;

/// A `major.minor.patch` release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub major: String,
    pub minor: u64,
    pub patch: String,
}

impl ReleaseVersion {
    /// Next minor release: `major.(minor+1).0`. Fails when the minor
    /// component is already the largest representable value.
    pub fn next_minor(&self) -> Result<Self, ToolError> {
        let minor = self
            .minor
            .checked_add(1)
            .ok_or_else(|| ToolError::MinorOverflow(self.to_string()))?;

        Ok(Self {
            major: self.major.clone(),
            minor,
            patch: "0".into(),
        })
    }
}

impl FromStr for ReleaseVersion {
    type Err = ToolError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let parts = tag.split('.').collect::<Vec<&str>>();

        let [major, minor, patch] = parts.as_slice() else {
            return Err(ToolError::InvalidTag(tag.to_string()));
        };

        let minor =
            minor
                .parse::<u64>()
                .map_err(|source| ToolError::InvalidMinor {
                    tag: tag.to_string(),
                    source,
                })?;

        Ok(Self {
            major: major.to_string(),
            minor,
            patch: patch.to_string(),
        })
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compute the version that follows `tag`.
pub fn calculate_new_version(tag: &str) -> Result<String, ToolError> {
    let current = tag.parse::<ReleaseVersion>()?;
    Ok(current.next_minor()?.to_string())
}
