/// Authentication strategies and their shared outcome type
///
/// Every inbound request is resolved to either an [`AuthContext`] carrying
/// the authenticated user's id, or an [`AuthError`] describing why the
/// credentials were rejected. Two strategies exist behind one trait:
///
/// - [`ApiKeyAuth`]: looks the `X-API-Key` header up in the user directory
/// - [`BearerTokenAuth`]: verifies the `Authorization: Bearer` token with
///   the [`TokenCodec`]
///
/// Exactly one strategy runs per request; [`Authenticator::authenticate`]
/// selects the API key strategy when the key header is present and the
/// bearer strategy otherwise. An `AuthContext` can only be obtained from a
/// successful authentication call, so no caller can observe a user id
/// before authenticating or after a rejection.
///
/// # Failure mapping
///
/// | Condition | Error | HTTP |
/// |---|---|---|
/// | key header absent/empty | `MissingCredential` | 400 |
/// | authorization header absent or not `Bearer <token>` | `MalformedCredential` | 400 |
/// | token malformed / payload unacceptable | `MalformedCredential` | 400 |
/// | key unknown to the directory | `InvalidCredential` | 401 |
/// | token signature mismatch or expired | `InvalidCredential` | 401 |
/// | directory lookup failed | `Directory` | 500 |
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use super::credential;
use super::token::{TokenCodec, TokenError};

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential was supplied where one was required
    #[error("missing credential")]
    MissingCredential,

    /// A credential was supplied but is not syntactically acceptable
    #[error("malformed credential")]
    MalformedCredential,

    /// A well-formed credential failed verification
    #[error("invalid credential")]
    InvalidCredential,

    /// The user directory lookup itself failed
    #[error("user directory lookup failed: {0}")]
    Directory(#[from] sqlx::Error),
}

/// Which strategy authenticated the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Static API key
    ApiKey,

    /// Signed bearer access token
    AccessToken,
}

/// Request-scoped authenticated identity
///
/// Produced only by a successful strategy call and inserted into the
/// request's extensions; never cached or shared across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Resolved user id
    pub user_id: i64,

    /// Strategy that resolved it
    pub method: AuthMethod,
}

/// Minimal user row the authentication core needs from the directory
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    /// User id
    pub id: i64,

    /// Argon2id password hash (consumed by the login flow, never logged)
    pub password_hash: String,
}

/// User lookup surface consumed by the authenticator
///
/// Implemented by the Postgres `users` gateway in production and by an
/// in-memory map in tests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by their API key
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<DirectoryUser>, sqlx::Error>;

    /// Finds a user by username
    async fn find_by_username(&self, username: &str)
        -> Result<Option<DirectoryUser>, sqlx::Error>;
}

/// A credential verification strategy
///
/// Both strategies share this trait so the router can treat them uniformly;
/// which one runs is decided per request from the headers alone.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Resolves the request headers to an authenticated identity
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError>;
}

/// API key strategy: `X-API-Key` header against the user directory
pub struct ApiKeyAuth {
    directory: Arc<dyn UserDirectory>,
}

impl ApiKeyAuth {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl AuthStrategy for ApiKeyAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let key = credential::api_key(headers).ok_or(AuthError::MissingCredential)?;

        let user = self
            .directory
            .find_by_api_key(&key)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        Ok(AuthContext {
            user_id: user.id,
            method: AuthMethod::ApiKey,
        })
    }
}

/// Bearer token strategy: `Authorization: Bearer` against the token codec
pub struct BearerTokenAuth {
    codec: TokenCodec,
}

impl BearerTokenAuth {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl AuthStrategy for BearerTokenAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        // A missing header and a non-Bearer header are both malformed for
        // this strategy; only the API key path distinguishes absence.
        let token = credential::bearer_token(headers)
            .map_err(|_| AuthError::MalformedCredential)?
            .ok_or(AuthError::MalformedCredential)?;

        let claims = self.codec.decode(&token).map_err(|e| match e {
            TokenError::InvalidSignature | TokenError::Expired => AuthError::InvalidCredential,
            TokenError::Malformed | TokenError::InvalidPayload | TokenError::Encode(_) => {
                AuthError::MalformedCredential
            }
        })?;

        Ok(AuthContext {
            user_id: claims.sub,
            method: AuthMethod::AccessToken,
        })
    }
}

/// Owns both strategies and selects one per request
pub struct Authenticator {
    api_key: ApiKeyAuth,
    bearer: BearerTokenAuth,
}

impl Authenticator {
    /// Builds the authenticator from its injected collaborators
    pub fn new(directory: Arc<dyn UserDirectory>, codec: TokenCodec) -> Self {
        Self {
            api_key: ApiKeyAuth::new(directory),
            bearer: BearerTokenAuth::new(codec),
        }
    }

    /// Picks the strategy for a request: API key when the key header is
    /// present, bearer token otherwise
    pub fn strategy_for(&self, headers: &HeaderMap) -> &dyn AuthStrategy {
        if credential::api_key(headers).is_some() {
            &self.api_key
        } else {
            &self.bearer
        }
    }

    /// Authenticates a request with the selected strategy
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        self.strategy_for(headers).authenticate(headers).await
    }
}
