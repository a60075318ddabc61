//! Fully-qualified domain names and zone containment.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest presentation-format name accepted, including the trailing dot.
pub const FQDN_MAX: usize = 254;

/// Reasons a name is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FqdnValidationError {
    /// Blank input.
    Empty,
    /// Relative name.
    MissingTrailingDot,
    /// Longer than [`FQDN_MAX`].
    TooLong { max: usize },
    /// Two consecutive dots or a leading dot.
    EmptyLabel,
    /// Whitespace or control characters.
    InvalidCharacters,
}

impl fmt::Display for FqdnValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "fqdn must not be empty"),
            Self::MissingTrailingDot => write!(f, "fqdn must end with a dot"),
            Self::TooLong { max } => write!(f, "fqdn must be at most {max} characters"),
            Self::EmptyLabel => write!(f, "fqdn must not contain empty labels"),
            Self::InvalidCharacters => {
                write!(f, "fqdn must not contain whitespace or control characters")
            }
        }
    }
}

impl std::error::Error for FqdnValidationError {}

/// Absolute DNS name in presentation format, normalised to lowercase.
///
/// # Examples
/// ```
/// use zone_api::domain::Fqdn;
///
/// let zone = Fqdn::new("Example.ORG.").unwrap();
/// let name = Fqdn::new("www.example.org.").unwrap();
/// assert_eq!(zone.as_ref(), "example.org.");
/// assert!(name.is_within(&zone));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fqdn(String);

impl Fqdn {
    /// Validate and normalise a name.
    pub fn new(name: impl Into<String>) -> Result<Self, FqdnValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, FqdnValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FqdnValidationError::Empty);
        }
        if trimmed.len() > FQDN_MAX {
            return Err(FqdnValidationError::TooLong { max: FQDN_MAX });
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(FqdnValidationError::InvalidCharacters);
        }
        let Some(body) = trimmed.strip_suffix('.') else {
            return Err(FqdnValidationError::MissingTrailingDot);
        };
        if !body.is_empty() && body.split('.').any(str::is_empty) {
            return Err(FqdnValidationError::EmptyLabel);
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// True when `self` equals `zone` or is a subdomain of it.
    ///
    /// Matching happens on label boundaries, so `badexample.org.` is not
    /// within `example.org.`.
    pub fn is_within(&self, zone: &Self) -> bool {
        if zone.is_root() || self.0 == zone.0 {
            return true;
        }
        self.0
            .strip_suffix(zone.0.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// True for the root name `.`.
    pub fn is_root(&self) -> bool {
        self.0 == "."
    }
}

impl AsRef<str> for Fqdn {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Fqdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Fqdn> for String {
    fn from(value: Fqdn) -> Self {
        value.0
    }
}

impl TryFrom<String> for Fqdn {
    type Error = FqdnValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fqdn(raw: &str) -> Fqdn {
        Fqdn::new(raw).expect("fixture fqdn")
    }

    #[rstest]
    #[case("", FqdnValidationError::Empty)]
    #[case("example.org", FqdnValidationError::MissingTrailingDot)]
    #[case("www..example.org.", FqdnValidationError::EmptyLabel)]
    #[case(".example.org.", FqdnValidationError::EmptyLabel)]
    #[case("bad name.org.", FqdnValidationError::InvalidCharacters)]
    fn invalid_names_are_rejected(#[case] raw: &str, #[case] expected: FqdnValidationError) {
        assert_eq!(Fqdn::new(raw), Err(expected));
    }

    #[rstest]
    fn overlong_name_is_rejected() {
        let raw = format!("{}.org.", "a".repeat(FQDN_MAX));
        assert_eq!(
            Fqdn::new(raw),
            Err(FqdnValidationError::TooLong { max: FQDN_MAX })
        );
    }

    #[rstest]
    #[case("example.org.", "example.org.", true)]
    #[case("www.example.org.", "example.org.", true)]
    #[case("a.b.example.org.", "example.org.", true)]
    #[case("WWW.Example.org.", "example.org.", true)]
    #[case("evil.com.", "example.org.", false)]
    #[case("badexample.org.", "example.org.", false)]
    #[case("org.", "example.org.", false)]
    #[case("anything.example.", ".", true)]
    fn containment_follows_label_boundaries(
        #[case] name: &str,
        #[case] zone: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(fqdn(name).is_within(&fqdn(zone)), expected);
    }
}
