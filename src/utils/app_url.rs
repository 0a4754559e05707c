//! Validation of URLs submitted for shortening.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Maximum accepted URL length in bytes.
pub const MAX_URL_LENGTH: usize = 4096;

/// Parses `input` and checks it targets the application's own origin.
///
/// Returns the URL in its serialized (parsed) form, which is the form stored
/// and hashed, so equivalent spellings dedupe to one code. Fragments and
/// query strings are kept: they carry the application state.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the URL is too long, malformed, or
/// points anywhere other than `app_origin`.
pub fn ensure_app_url(input: &str, app_origin: &Url) -> Result<String, AppError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(AppError::bad_request(
            "URL is too long",
            json!({ "max_length": MAX_URL_LENGTH }),
        ));
    }

    let url = Url::parse(input.trim()).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if url.origin() != app_origin.origin() {
        return Err(AppError::bad_request(
            "URL must point at this application",
            json!({ "expected_origin": app_origin.origin().ascii_serialization() }),
        ));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://app.example").unwrap()
    }

    #[test]
    fn test_accepts_same_origin_and_keeps_fragment() {
        let url = ensure_app_url("https://app.example/#a", &origin()).unwrap();
        assert_eq!(url, "https://app.example/#a");
    }

    #[test]
    fn test_normalizes_equivalent_spellings() {
        let a = ensure_app_url("https://APP.example:443/?s=1#x", &origin()).unwrap();
        let b = ensure_app_url("https://app.example/?s=1#x", &origin()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_foreign_host() {
        let err = ensure_app_url("https://evil.example/#a", &origin()).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_rejects_scheme_downgrade() {
        assert!(ensure_app_url("http://app.example/#a", &origin()).is_err());
    }

    #[test]
    fn test_rejects_lookalike_userinfo_trick() {
        assert!(ensure_app_url("https://app.example@evil.example/", &origin()).is_err());
    }

    #[test]
    fn test_rejects_garbage_and_overlong() {
        assert!(ensure_app_url("not a url", &origin()).is_err());
        let long = format!("https://app.example/#{}", "a".repeat(MAX_URL_LENGTH));
        assert!(ensure_app_url(&long, &origin()).is_err());
    }
}
