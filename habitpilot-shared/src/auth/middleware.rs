/// Bearer authentication for Axum
///
/// [`jwt_auth_middleware`] validates `Authorization: Bearer <access token>`
/// and stores an [`AuthContext`] in the request extensions. Handlers take
/// `AuthContext` as an extractor; it rejects with 401 when the middleware did
/// not run or failed.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use habitpilot_shared::auth::jwt::JwtKeys;
/// use habitpilot_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn whoami(auth: AuthContext) -> String {
///     auth.user_id.to_string()
/// }
///
/// let keys = JwtKeys::new("a-secret-key-of-at-least-32-bytes!");
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(move |req, next| {
///         jwt_auth_middleware(keys.clone(), req, next)
///     }));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{JwtError, JwtKeys};

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Owner id used to scope every task and score query
    pub user_id: Uuid,
}

/// Authentication failure
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token rejected
    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Validates the bearer token in `headers`
pub fn authenticate_bearer(headers: &HeaderMap, keys: &JwtKeys) -> Result<AuthContext, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = keys.validate_access(token)?;

    Ok(AuthContext { user_id: claims.sub })
}

/// Axum middleware inserting [`AuthContext`] for valid access tokens
pub async fn jwt_auth_middleware(
    keys: JwtKeys,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = authenticate_bearer(req.headers(), &keys).map_err(|e| {
        debug!(error = %e, path = %req.uri().path(), "Rejected request");
        e
    })?;

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
