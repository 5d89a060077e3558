/// Middleware for the API server
///
/// - `security`: security response headers
///
/// Bearer authentication lives in `habitpilot_shared::auth::middleware`.

pub mod security;
