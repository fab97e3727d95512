/// Credential extraction from request headers
///
/// Pure header inspection with no side effects. A request can carry
/// credential material in one of two places:
///
/// - `X-API-Key`: an opaque per-user API key; any non-empty value is
///   syntactically valid, and an empty or absent header means "no
///   credential"
/// - `Authorization: Bearer <token>`: a signed access token; the scheme is
///   case-sensitive and must be separated from the token by one or more
///   whitespace characters
///
/// A present-but-unparseable `Authorization` header is a *malformed*
/// credential, which is a distinct condition from an absent one: the
/// authenticator maps the former to a 400 and the latter never reaches the
/// bearer strategy at all.
use axum::http::{header, HeaderMap};

/// Header carrying the per-user API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Error type for credential extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The Authorization header is present but is not `Bearer <token>`
    #[error("authorization header is not a valid Bearer credential")]
    MalformedAuthorization,
}

/// Reads the API key from the request headers.
///
/// Returns `None` when the header is absent, empty, or not valid UTF-8.
/// No further syntax is enforced; the key is opaque.
pub fn api_key(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(API_KEY_HEADER)?.to_str().ok()?;

    if value.is_empty() {
        return None;
    }

    Some(value.to_string())
}

/// Reads the bearer token from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent, `Ok(Some(token))` when it
/// matches `Bearer <token>`, and `CredentialError::MalformedAuthorization`
/// for anything else (wrong scheme, lowercase scheme, missing separator,
/// empty token, or a token containing whitespace).
///
/// # Example
///
/// ```
/// use axum::http::HeaderMap;
/// use taskdeck_shared::auth::credential::bearer_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("Authorization", "Bearer abc.def.ghi".parse().unwrap());
/// assert_eq!(bearer_token(&headers).unwrap(), Some("abc.def.ghi".to_string()));
///
/// let mut headers = HeaderMap::new();
/// headers.insert("Authorization", "Basic abc".parse().unwrap());
/// assert!(bearer_token(&headers).is_err());
/// ```
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, CredentialError> {
    let value = match headers.get(header::AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .map_err(|_| CredentialError::MalformedAuthorization)?,
        None => return Ok(None),
    };

    parse_bearer(value)
        .map(|token| Some(token.to_string()))
        .ok_or(CredentialError::MalformedAuthorization)
}

/// Parses `Bearer <token>` with a case-sensitive scheme and one or more
/// whitespace separators.
fn parse_bearer(value: &str) -> Option<&str> {
    let rest = value.strip_prefix("Bearer")?;

    // At least one separator between scheme and token
    if !rest.starts_with([' ', '\t']) {
        return None;
    }

    let token = rest.trim_start_matches([' ', '\t']);
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token)
}
