/// Authentication primitives for taskdeck
///
/// This module decides, for every inbound request, whether it carries valid
/// credentials and which user those credentials identify.
///
/// # Modules
///
/// - [`credential`]: reads raw credential material from request headers
/// - [`token`]: encodes/decodes the HS256-signed access token
/// - [`authenticator`]: the two authentication strategies (API key, bearer
///   token) and their shared outcome type
/// - [`api_key`]: API key generation
/// - [`password`]: Argon2id password hashing and verification
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, never stored or logged in plaintext
/// - **Access Tokens**: HS256 signing with constant-time MAC comparison
/// - **API Keys**: 32-char random keys generated once at registration
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::token::{Claims, TokenCodec};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("a-server-secret-of-at-least-32-bytes!");
/// let token = codec.encode(&Claims::new(7))?;
/// assert_eq!(codec.decode(&token)?.sub, 7);
/// # Ok(())
/// # }
/// ```
pub mod api_key;
pub mod authenticator;
pub mod credential;
pub mod password;
pub mod token;
