/// Authorization guard
///
/// Turns the raw `Authorization` header of a protected request into a
/// [`Principal`]. Validation checks the signature, issuer and expiry of the
/// session token, then consults the revocation blocklist so tokens whose
/// session was logged out stop working immediately.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tenantdesk_shared::auth::guard::AuthGuard;
/// use tenantdesk_shared::auth::jwt::SessionConfig;
/// use tenantdesk_shared::store::MemoryStore;
///
/// # async fn example(header: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
/// let guard = AuthGuard::new(
///     Arc::new(MemoryStore::new()),
///     SessionConfig::new("a-signing-secret-of-at-least-32-bytes!"),
/// );
///
/// let principal = guard.authenticate(header).await?;
/// println!("user {} in tenant {}", principal.user_id, principal.tenant_id);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::jwt::{validate_token, Claims, SessionConfig};
use crate::error::{CoreError, CoreResult};
use crate::models::user::Role;
use crate::store::RevocationRepository;

/// Authenticated identity derived from a validated session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,

    pub tenant_id: Uuid,

    /// Role as of token issuance
    pub role: Role,

    /// Token `jti`, needed to revoke this session
    pub token_id: Uuid,

    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            role: claims.role,
            token_id: claims.jti,
            expires_at,
        }
    }
}

/// Principal plus request metadata passed into mutating operations
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub principal: Principal,

    /// Client address recorded on audit entries
    pub source_addr: Option<String>,
}

impl RequestContext {
    pub fn new(principal: Principal, source_addr: Option<String>) -> Self {
        Self {
            principal,
            source_addr,
        }
    }
}

/// Extracts the token from a `Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Validates session tokens on protected requests
#[derive(Clone)]
pub struct AuthGuard {
    revocations: Arc<dyn RevocationRepository>,
    session: SessionConfig,
}

impl AuthGuard {
    pub fn new(revocations: Arc<dyn RevocationRepository>, session: SessionConfig) -> Self {
        Self {
            revocations,
            session,
        }
    }

    /// Authenticates a request from its `Authorization` header value
    ///
    /// # Errors
    ///
    /// - `CoreError::Unauthorized` if the header is missing or malformed, or
    ///   the token is invalid, expired or revoked
    /// - `CoreError::Internal` if the blocklist cannot be read
    pub async fn authenticate(&self, authorization: Option<&str>) -> CoreResult<Principal> {
        let header_value =
            authorization.ok_or_else(|| CoreError::Unauthorized("Token missing".to_string()))?;

        let token = bearer_token(header_value).ok_or_else(|| {
            CoreError::Unauthorized("Invalid authorization header format".to_string())
        })?;

        self.authenticate_token(token).await
    }

    /// Authenticates a bare token string
    pub async fn authenticate_token(&self, token: &str) -> CoreResult<Principal> {
        let claims = validate_token(token, &self.session.secret).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            CoreError::from(e)
        })?;

        if self.revocations.is_token_revoked(claims.jti).await? {
            debug!(jti = %claims.jti, user_id = %claims.sub, "Revoked session token presented");
            return Err(CoreError::Unauthorized("Invalid token".to_string()));
        }

        Ok(Principal::from(claims))
    }
}
