/// JWT issuance and validation
///
/// Tokens are HS256-signed and carry the user id as `sub`. Two kinds exist:
///
/// - **Access token** (24h by default): sent as `Authorization: Bearer` on
///   every API call
/// - **Refresh token** (30d by default): exchanged for a new access token
///
/// [`JwtKeys`] holds the signing keys and lifetimes so handlers never touch
/// the raw secret.
///
/// # Example
///
/// ```
/// use habitpilot_shared::auth::jwt::{JwtKeys, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), habitpilot_shared::auth::jwt::JwtError> {
/// let keys = JwtKeys::new("a-secret-key-of-at-least-32-bytes!");
/// let user_id = Uuid::new_v4();
///
/// let pair = keys.issue_pair(user_id)?;
/// let claims = keys.validate_access(&pair.access_token)?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.token_type, TokenType::Access);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// `iss` claim of every token
pub const ISSUER: &str = "habitpilot";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Signing failed
    #[error("Failed to create token: {0}")]
    Encode(String),

    /// Bad signature, malformed token or wrong issuer
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token is past its `exp`
    #[error("Token has expired")]
    Expired,

    /// A refresh token was used where an access token is required, or the reverse
    #[error("Expected {expected} token, got {actual} token")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived API token
    Access,

    /// Long-lived token for obtaining new access tokens
    Refresh,
}

impl TokenType {
    /// Lowercase name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    /// Always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl` from now
    pub fn new(user_id: Uuid, token_type: TokenType, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Whether `exp` has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Access and refresh token issued together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Signing keys plus token lifetimes
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Default access token lifetime
    pub const DEFAULT_ACCESS_TTL_HOURS: i64 = 24;

    /// Default refresh token lifetime
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

    /// Keys for `secret` with the default lifetimes
    pub fn new(secret: &str) -> Self {
        Self::with_ttls(
            secret,
            Duration::hours(Self::DEFAULT_ACCESS_TTL_HOURS),
            Duration::days(Self::DEFAULT_REFRESH_TTL_DAYS),
        )
    }

    /// Keys for `secret` with custom lifetimes
    pub fn with_ttls(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime of tokens of the given type
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Signs `claims`
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }

    /// Issues a token of the given type for `user_id`
    pub fn issue(&self, user_id: Uuid, token_type: TokenType) -> Result<String, JwtError> {
        self.encode(&Claims::new(user_id, token_type, self.ttl(token_type)))
    }

    /// Issues an access and a refresh token for `user_id`
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenType::Access)?,
            refresh_token: self.issue(user_id, TokenType::Refresh)?,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Checks signature, expiry, `nbf` and issuer
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }

    /// Validates an access token
    pub fn validate_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validates a refresh token
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    /// Exchanges a refresh token for a new access token
    pub fn refresh(&self, refresh_token: &str) -> Result<String, JwtError> {
        let claims = self.validate_refresh(refresh_token)?;
        self.issue(claims.sub, TokenType::Access)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.validate(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_validate() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id, TokenType::Access).unwrap();
        let claims = keys.validate(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_default_lifetimes() {
        let keys = JwtKeys::new(SECRET);
        assert_eq!(keys.ttl(TokenType::Access), Duration::hours(24));
        assert_eq!(keys.ttl(TokenType::Refresh), Duration::days(30));

        let pair = keys.issue_pair(Uuid::new_v4()).unwrap();
        assert_eq!(pair.expires_in, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtKeys::new(SECRET)
            .issue(Uuid::new_v4(), TokenType::Access)
            .unwrap();

        let result = JwtKeys::new("another-secret-key-of-32-bytes-len").validate(&token);
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_expired_token() {
        let keys = JwtKeys::new(SECRET);
        // Well beyond the default validation leeway
        let claims = Claims::new(Uuid::new_v4(), TokenType::Access, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = keys.encode(&claims).unwrap();
        assert!(matches!(keys.validate(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let keys = JwtKeys::new(SECRET);
        let mut claims = Claims::new(Uuid::new_v4(), TokenType::Access, Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = keys.encode(&claims).unwrap();
        assert!(matches!(keys.validate(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let keys = JwtKeys::new(SECRET);
        let pair = keys.issue_pair(Uuid::new_v4()).unwrap();

        assert!(keys.validate_access(&pair.access_token).is_ok());
        assert!(keys.validate_refresh(&pair.refresh_token).is_ok());

        let err = keys.validate_access(&pair.refresh_token).unwrap_err();
        assert!(matches!(
            err,
            JwtError::WrongType {
                expected: TokenType::Access,
                actual: TokenType::Refresh
            }
        ));
        assert_eq!(err.to_string(), "Expected access token, got refresh token");

        assert!(keys.refresh(&pair.access_token).is_err());
    }

    #[test]
    fn test_refresh_issues_access_token_for_same_user() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();
        let pair = keys.issue_pair(user_id).unwrap();

        let access = keys.refresh(&pair.refresh_token).unwrap();
        let claims = keys.validate_access(&access).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", JwtKeys::new(SECRET));
        assert!(debug.contains("access_ttl"));
        assert!(!debug.contains(SECRET));
    }
}
