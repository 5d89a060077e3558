/// Authentication
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access/refresh tokens
/// - [`middleware`]: Bearer token middleware and the [`middleware::AuthContext`] extractor
///
/// # Example
///
/// ```
/// use habitpilot_shared::auth::jwt::JwtKeys;
/// use habitpilot_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let keys = JwtKeys::new("a-secret-key-of-at-least-32-bytes!");
/// let tokens = keys.issue_pair(Uuid::new_v4())?;
/// assert!(!tokens.access_token.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
