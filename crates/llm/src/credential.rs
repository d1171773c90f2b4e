//! Optional-capability credentials.

use std::fmt;

/// Credential for a role that may run without one.
///
/// Decided once, when the adapter is constructed; never re-checked per call.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// An API key is available; the adapter calls its service.
    Configured(String),
    /// No key; the adapter short-circuits to a fixed placeholder.
    Unconfigured,
}

impl Credential {
    /// Builds a credential from a raw configuration value.
    ///
    /// Absent, empty, and whitespace-only values are all `Unconfigured`.
    pub fn from_value(value: Option<String>) -> Self {
        match value {
            Some(key) if !key.trim().is_empty() => Self::Configured(key),
            _ => Self::Unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::Unconfigured
    }
}

// Keeps keys out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(_) => f.write_str("Configured(***)"),
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_unconfigured() {
        assert_eq!(Credential::from_value(None), Credential::Unconfigured);
        assert_eq!(
            Credential::from_value(Some(String::new())),
            Credential::Unconfigured
        );
        assert_eq!(
            Credential::from_value(Some("   ".to_string())),
            Credential::Unconfigured
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let credential = Credential::from_value(Some("pplx-secret".to_string()));
        assert!(credential.is_configured());
        assert_eq!(format!("{credential:?}"), "Configured(***)");
    }
}
