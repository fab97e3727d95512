/// Access-token codec
///
/// Encodes and decodes the signed access token: three base64url segments
/// (`header.payload.signature`) where the signature is an HMAC-SHA256 over
/// the first two segments, computed with a server-held secret and compared
/// in constant time on decode. Signing and verification are delegated to
/// the `jsonwebtoken` crate (HS256); this module pins the claim set and
/// maps the crate's error kinds onto the codec's failure taxonomy.
///
/// # Failure taxonomy
///
/// - [`TokenError::Malformed`]: not exactly three non-empty segments, or a
///   segment is not valid base64url
/// - [`TokenError::InvalidSignature`]: the recomputed MAC does not match
/// - [`TokenError::InvalidPayload`]: the payload is not a JSON object, or
///   the required claims (`sub`, `exp`, `iss`) are missing or unacceptable
/// - [`TokenError::Expired`]: the `exp` claim is in the past
///
/// The secret is injected at construction, lives for the whole process, and
/// is never rotated, logged, or echoed in responses.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::token::{Claims, TokenCodec};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("a-server-secret-of-at-least-32-bytes!");
///
/// let token = codec.encode(&Claims::new(42))?;
/// let claims = codec.decode(&token)?;
/// assert_eq!(claims.sub, 42);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped into every token this codec signs
pub const ISSUER: &str = "taskdeck";

/// Error type for token codec operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token does not split into three non-empty base64url segments
    #[error("token is not a well-formed three-segment token")]
    Malformed,

    /// Recomputed MAC does not match the signature segment
    #[error("token signature does not match")]
    InvalidSignature,

    /// Payload decoded but is not an acceptable claims object
    #[error("token payload is missing or has invalid claims")]
    InvalidPayload,

    /// Token expiry claim is in the past
    #[error("token has expired")]
    Expired,

    /// Token creation failed
    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Claims carried by an access token
///
/// `sub` is the authenticated user's id; the remaining claims are the
/// standard issued-at/expiry/issuer set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer - always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the default 24 hour expiration
    pub fn new(user_id: i64) -> Self {
        Self::with_expiration(user_id, Duration::hours(24))
    }

    /// Creates claims with a custom expiration
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Token codec holding the process-wide signing secret
///
/// Cheap to clone; both keys are derived from the secret once at
/// construction.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec from the server secret.
    ///
    /// The secret should be at least 32 bytes; the configuration layer
    /// enforces this before the codec is built.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs a claims set into a token string
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verifies a token string and extracts its claims
    ///
    /// The signature is checked before any claim is inspected, so a
    /// tampered token always fails with `InvalidSignature` rather than a
    /// claim error.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        // Segment check up front: jsonwebtoken reports an empty payload
        // segment as a claims error, but the codec contract calls a token
        // with fewer than three non-empty segments malformed.
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(TokenError::Malformed);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                    TokenError::Malformed
                }
                _ => TokenError::InvalidPayload,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    /// Replaces the first character of the signature segment with a
    /// different base64url character, keeping the token well-formed. The
    /// first character only carries fully-used bits, so the result is still
    /// valid base64url and decodes to a different MAC.
    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{}.{}", head, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_claims_new_sets_issuer_and_expiry() {
        let claims = Claims::new(7);
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_round_trip_preserves_subject() {
        let codec = codec();
        let token = codec.encode(&Claims::new(1234)).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.sub, 1234);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_tampered_signature_is_invalid_signature() {
        let codec = codec();
        let token = codec.encode(&Claims::new(9)).unwrap();
        let tampered = tamper_signature(&token);
        assert_ne!(token, tampered);
        assert!(matches!(
            codec.decode(&tampered),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = codec().encode(&Claims::new(9)).unwrap();
        let other = TokenCodec::new("another-secret-key-also-32-bytes-long!");
        assert!(matches!(
            other.decode(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_two_segments_is_malformed() {
        assert!(matches!(
            codec().decode("abc.def"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_empty_segment_is_malformed() {
        assert!(matches!(
            codec().decode("abc..def"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_non_base64url_segment_is_malformed() {
        // '!' is outside the base64url alphabet; must never be reported as
        // a signature failure
        let token = codec().encode(&Claims::new(9)).unwrap();
        let (head, _) = token.rsplit_once('.').unwrap();
        let result = codec().decode(&format!("{}.!!!", head));
        assert!(matches!(result, Err(TokenError::Malformed)));
    }

    #[test]
    fn test_payload_missing_subject_is_invalid_payload() {
        // Valid signature over a payload without `sub`
        #[derive(Serialize)]
        struct NoSubject {
            iss: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let payload = NoSubject {
            iss: ISSUER.to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            codec().decode(&token),
            Err(TokenError::InvalidPayload)
        ));
    }

    #[test]
    fn test_foreign_issuer_is_invalid_payload() {
        #[derive(Serialize)]
        struct ForeignClaims {
            sub: i64,
            iss: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let payload = ForeignClaims {
            sub: 1,
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            codec().decode(&token),
            Err(TokenError::InvalidPayload)
        ));
    }

    #[test]
    fn test_expired_token_is_expired() {
        let codec = codec();
        let claims = Claims::with_expiration(9, Duration::seconds(-3600));
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
    }
}
