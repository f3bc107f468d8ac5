use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A chromedriver release version as published on the listing page.
///
/// Versions are two-component dotted strings such as `2.41`. Ordering is by
/// the numeric value of the whole token, so `2.5` sorts above `2.41` — this
/// matches how the vendor numbered these releases and is a documented
/// limitation of the scheme, not semver.
#[derive(Debug, Clone)]
pub struct DriverVersion {
    raw: String,
    value: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum VersionParseError {
    #[error("expected MAJOR.MINOR version format, got: {input}")]
    InvalidFormat { input: String },
}

impl DriverVersion {
    /// The version token exactly as published.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric value the ordering is based on.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Strictly-greater comparison; equality is "already up to date".
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value) == Ordering::Greater
    }
}

impl FromStr for DriverVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || VersionParseError::InvalidFormat {
            input: trimmed.to_string(),
        };

        let (major, minor) = trimmed.split_once('.').ok_or_else(invalid)?;
        if major.is_empty()
            || minor.is_empty()
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let value = trimmed.parse::<f64>().map_err(|_| invalid())?;
        Ok(Self {
            raw: trimmed.to_string(),
            value,
        })
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for DriverVersion {
    fn eq(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value) == Ordering::Equal
    }
}

impl Eq for DriverVersion {}

impl Ord for DriverVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl PartialOrd for DriverVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
