// SPDX-License-Identifier: MIT OR Apache-2.0
//! `major.minor` document versions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` file version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileVersion {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
}

impl FileVersion {
    /// Create a version
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether this version is readable given the oldest supported version
    /// and the first unsupported one
    pub fn is_supported(&self, min: FileVersion, unsupported: FileVersion) -> bool {
        (self.major == min.major && self.minor >= min.minor)
            || (min.major < self.major && self.major < unsupported.major)
            || (self.major == unsupported.major && self.minor < unsupported.minor)
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error parsing a version string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed version string: '{0}'")]
pub struct ParseVersionError(pub String);

impl FromStr for FileVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseVersionError(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }
}

impl TryFrom<String> for FileVersion {
    type Error = ParseVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FileVersion> for String {
    fn from(version: FileVersion) -> Self {
        version.to_string()
    }
}

/// Whether a version string is supported; malformed strings are not
pub fn is_version_supported(version: &str, min: FileVersion, unsupported: FileVersion) -> bool {
    version
        .parse::<FileVersion>()
        .is_ok_and(|v| v.is_supported(min, unsupported))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: FileVersion = FileVersion::new(1, 0);
    const UNSUPPORTED: FileVersion = FileVersion::new(2, 0);

    #[test]
    fn test_version_gating() {
        assert!(is_version_supported("1.0", MIN, UNSUPPORTED));
        assert!(is_version_supported("1.1", MIN, UNSUPPORTED));
        assert!(is_version_supported("1.25", MIN, UNSUPPORTED));
        assert!(!is_version_supported("0.9", MIN, UNSUPPORTED));
        assert!(!is_version_supported("2.0", MIN, UNSUPPORTED));
        assert!(!is_version_supported("3.1", MIN, UNSUPPORTED));
    }

    #[test]
    fn test_wide_range_allows_middle_majors() {
        let unsupported = FileVersion::new(4, 2);
        assert!(is_version_supported("2.7", MIN, unsupported));
        assert!(is_version_supported("4.1", MIN, unsupported));
        assert!(!is_version_supported("4.2", MIN, unsupported));
    }

    #[test]
    fn test_malformed_versions() {
        for bad in ["", "1", "1.x", "a.b", "1.0.0", "-1.0"] {
            assert!(!is_version_supported(bad, MIN, UNSUPPORTED), "{bad}");
        }
        assert_eq!("1.1".parse::<FileVersion>().unwrap().to_string(), "1.1");
    }
}
