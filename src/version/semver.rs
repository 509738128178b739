use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::version::types::BumpType;

/// Accepted version format; a leading `v` (Go module style) is tolerated on input only
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(-.*)?$").expect("version pattern is valid")
});

/// A released package version: `major.minor.patch` with an optional `-suffix`
///
/// `Eq` includes the suffix. Ordering goes through [`ReleaseVersion::core`] or
/// [`sort_versions`], both of which look at the numeric triple only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release/build suffix including the leading `-`
    pub suffix: Option<String>,
}

impl ReleaseVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: None,
        }
    }

    /// Parse a version string such as `1.2.3`, `v2.0.0` or `1.0.0-beta.1`.
    ///
    /// Surrounding whitespace is ignored. Returns `None` when the input does not match
    /// `\d+\.\d+\.\d+(-.*)?` or a component overflows `u64`.
    pub fn parse(input: &str) -> Option<Self> {
        let captures = VERSION_PATTERN.captures(input.trim())?;
        let component = |i: usize| captures.get(i)?.as_str().parse::<u64>().ok();

        Some(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            suffix: captures.get(4).map(|m| m.as_str().to_string()),
        })
    }

    /// The `(major, minor, patch)` triple used for ordering
    pub fn core(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Compute the next version for a bump type. Any suffix is dropped.
    ///
    /// Returns `None` when the bumped component is already `u64::MAX`.
    pub fn bump(&self, bump: BumpType) -> Option<Self> {
        let next = match bump {
            BumpType::Major => Self::new(self.major.checked_add(1)?, 0, 0),
            BumpType::Minor => Self::new(self.major, self.minor.checked_add(1)?, 0),
            BumpType::Patch => Self::new(self.major, self.minor, self.patch.checked_add(1)?),
        };
        Some(next)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(suffix) = &self.suffix {
            f.write_str(suffix)?;
        }
        Ok(())
    }
}

/// Sort versions ascending by `(major, minor, patch)`.
///
/// The sort is stable: versions with equal triples keep their input order.
pub fn sort_versions(mut versions: Vec<ReleaseVersion>) -> Vec<ReleaseVersion> {
    versions.sort_by_key(ReleaseVersion::core);
    versions
}

/// Highest version in a list of raw strings, skipping anything unparseable
pub fn latest_of<'a, I>(candidates: I) -> Option<ReleaseVersion>
where
    I: IntoIterator<Item = &'a str>,
{
    let parsed = candidates
        .into_iter()
        .filter_map(ReleaseVersion::parse)
        .collect();
    sort_versions(parsed).pop()
}
