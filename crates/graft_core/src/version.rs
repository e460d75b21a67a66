//! Format versioning for persisted snapshot documents

use core::fmt;

use serde::{Deserialize, Serialize};

/// Version of the on-disk snapshot layout
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
}

impl FormatVersion {
    /// Create a new version
    #[inline]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Layout written by this build
    pub const CURRENT: FormatVersion = FormatVersion::new(1, 0);

    /// Whether a reader at `self` understands a document written at `stored`.
    ///
    /// Majors must match; minors only ever add optional data, so anything up
    /// to our own minor is readable.
    pub fn can_read(&self, stored: &FormatVersion) -> bool {
        self.major == stored.major && stored.minor <= self.minor
    }

    /// Parse from string "major.minor"
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl fmt::Debug for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormatVersion({})", self)
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = FormatVersion::parse("1.2").unwrap();
        assert_eq!(v, FormatVersion::new(1, 2));
        assert!(FormatVersion::parse("1").is_none());
        assert!(FormatVersion::parse("a.b").is_none());
    }

    #[test]
    fn test_can_read() {
        let reader = FormatVersion::new(1, 2);
        assert!(reader.can_read(&FormatVersion::new(1, 0)));
        assert!(reader.can_read(&FormatVersion::new(1, 2)));
        assert!(!reader.can_read(&FormatVersion::new(1, 3)));
        assert!(!reader.can_read(&FormatVersion::new(2, 0)));
    }
}
