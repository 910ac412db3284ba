/// Session token generation and validation
///
/// Session tokens are HS256-signed JWTs. They are self-contained: identity,
/// tenant and role travel in the claims, and the only server-side state is
/// the revocation blocklist keyed by the token's `jti`.
///
/// # Claims
///
/// - `sub`: user ID
/// - `tenant_id`: owning tenant of the user
/// - `role`: role at issuance time
/// - `jti`: unique token ID, used for revocation
/// - `iss`: always `"tenantdesk"`
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use tenantdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use tenantdesk_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-signing-secret-of-at-least-32-bytes!";
/// let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), Role::User, Duration::hours(24));
///
/// let token = create_token(&claims, secret)?;
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.jti, claims.jti);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Issuer claim of every session token
pub const ISSUER: &str = "tenantdesk";

/// Default session lifetime: 24 hours
pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, issuer, format or `nbf` check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Values the session issuer and guard need
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HS256 signing secret (at least 32 bytes)
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_seconds: i64,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Tenant ID (custom claim)
    pub tenant_id: Uuid,

    /// Role at issuance (custom claim)
    pub role: Role,

    /// Token ID
    pub jti: Uuid,

    /// Issuer - Always "tenantdesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims expiring `ttl` from now with a fresh `jti`
    pub fn new(user_id: Uuid, tenant_id: Uuid, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            tenant_id,
            role,
            jti: Uuid::new_v4(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the HS256 signature, the issuer, `exp` and `nbf`.
///
/// # Errors
///
/// - `JwtError::Expired` if the token is past `exp`
/// - `JwtError::ValidationError` for any other failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn claims() -> Claims {
        Claims::new(Uuid::new_v4(), Uuid::new_v4(), Role::TenantAdmin, Duration::hours(24))
    }

    #[test]
    fn test_claims_new() {
        let claims = claims();

        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 86_400);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.role, Role::TenantAdmin);
    }

    #[test]
    fn test_each_token_gets_unique_jti() {
        assert_ne!(claims().jti, claims().jti);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = claims();
        let token = create_token(&claims, SECRET).expect("Token creation should succeed");

        let validated = validate_token(&token, SECRET).expect("Token validation should succeed");
        assert_eq!(validated, claims);
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let token = create_token(&claims(), SECRET).unwrap();

        let result = validate_token(&token, "a-different-secret-of-32-bytes-long!");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        // Past the default 60s leeway
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), Role::User, Duration::hours(-2));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut claims = claims();
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not.a.token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn test_expires_at_matches_exp() {
        let claims = claims();
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }

    #[test]
    fn test_session_config_default_ttl() {
        let config = SessionConfig::new(SECRET);
        assert_eq!(config.ttl(), Duration::hours(24));
    }
}
