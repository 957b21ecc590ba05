//! Request authentication helpers.
//!
//! The worklist API trusts an upstream gateway for sign-in. Every request must carry the shared
//! `x-api-key`, and the signed-in caregiver is named by `x-caregiver-ref`.

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header naming the signed-in caregiver.
pub const CAREGIVER_HEADER: &str = "x-caregiver-ref";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("API_KEY not set in environment")]
    KeyNotConfigured,
    #[error("missing API key")]
    MissingKey,
    #[error("invalid API key")]
    InvalidKey,
}

/// Resolve the server's expected API key from an optional environment value.
///
/// # Errors
///
/// Returns [`AuthError::KeyNotConfigured`] if the value is missing or blank.
pub fn api_key_from_env_value(value: Option<String>) -> Result<String, AuthError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::KeyNotConfigured)
}

/// Validates the provided API key against the expected one.
///
/// Returns `Ok(())` if the key is valid, or an error if invalid or missing.
pub fn validate_api_key(provided_key: Option<&str>, expected_key: &str) -> Result<(), AuthError> {
    match provided_key {
        None => Err(AuthError::MissingKey),
        Some(key) if key == expected_key => Ok(()),
        Some(_) => Err(AuthError::InvalidKey),
    }
}

/// The caregiver named by the identity header, if any. Blank values count as absent.
pub fn caregiver_from_header(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_checks() {
        assert_eq!(validate_api_key(Some("s3cret"), "s3cret"), Ok(()));
        assert_eq!(
            validate_api_key(Some("guess"), "s3cret"),
            Err(AuthError::InvalidKey)
        );
        assert_eq!(validate_api_key(None, "s3cret"), Err(AuthError::MissingKey));
    }

    #[test]
    fn server_key_must_be_configured() {
        assert_eq!(api_key_from_env_value(Some(" k ".into())), Ok("k".into()));
        assert_eq!(
            api_key_from_env_value(Some("  ".into())),
            Err(AuthError::KeyNotConfigured)
        );
        assert_eq!(api_key_from_env_value(None), Err(AuthError::KeyNotConfigured));
    }

    #[test]
    fn caregiver_header_is_trimmed() {
        assert_eq!(caregiver_from_header(Some(" cg-1 ")), Some("cg-1"));
        assert_eq!(caregiver_from_header(Some("")), None);
        assert_eq!(caregiver_from_header(None), None);
    }
}
