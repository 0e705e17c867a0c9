//! WebSocket authentication: validates the JWT passed as a query parameter.

use std::sync::Arc;

use planhub_auth::jwt::JwtDecoder;
use planhub_core::error::AppError;
use planhub_entity::user::UserRole;

/// Authenticated connection info extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedConnection {
    /// User ID.
    pub user_id: i64,
    /// User role.
    pub role: UserRole,
    /// Username.
    pub username: String,
}

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a connection using a JWT token.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedConnection, AppError> {
        let claims = self.decoder.decode_access_token(token)?;

        Ok(AuthenticatedConnection {
            user_id: claims.user_id(),
            role: claims.role,
            username: claims.username,
        })
    }
}
