/// Core error taxonomy
///
/// Every service operation returns [`CoreResult`]. The HTTP layer maps each
/// kind onto a status code; the core never produces HTTP artifacts itself.
///
/// | Kind | Raised for |
/// |---|---|
/// | `NotFound` | missing entity, or one owned by another tenant |
/// | `Unauthorized` | missing, invalid, expired or revoked token; bad credentials |
/// | `Forbidden` | role mismatch, quota reached, self-deletion, cross-tenant reference, inactive tenant |
/// | `Conflict` | duplicate subdomain, duplicate email within a tenant |
/// | `Validation` | malformed input |
/// | `Internal` | unexpected store or crypto failure |

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Details are for logs only, callers see a generic message
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &str) -> Self {
        CoreError::NotFound(format!("{} not found", entity))
    }

    /// Same message for every credential failure
    pub fn invalid_credentials() -> Self {
        CoreError::Unauthorized("Invalid credentials".to_string())
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => CoreError::Conflict(message),
            StoreError::QuotaExceeded { quota, .. } => {
                CoreError::Forbidden(format!("{} limit exceeded", quota.as_str()))
            }
            StoreError::NotFound(message) => CoreError::NotFound(message),
            StoreError::Unavailable(message) => CoreError::Internal(message),
            StoreError::Database(e) => CoreError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for CoreError {
    fn from(err: PasswordError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

impl From<JwtError> for CoreError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(message) => CoreError::Internal(message),
            JwtError::Expired => CoreError::Unauthorized("Token expired".to_string()),
            JwtError::ValidationError(_) => CoreError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<AuthzError> for CoreError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::InsufficientRole { .. } => CoreError::Forbidden(err.to_string()),
            AuthzError::TenantMismatch => CoreError::not_found("Tenant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::QuotaType;

    #[test]
    fn test_quota_maps_to_forbidden() {
        let err = CoreError::from(StoreError::QuotaExceeded {
            quota: QuotaType::Users,
            limit: 3,
            current: 3,
        });

        match err {
            CoreError::Forbidden(message) => assert_eq!(message, "User limit exceeded"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_store_conflict_stays_conflict() {
        let err = CoreError::from(StoreError::Conflict("Subdomain already exists".into()));
        assert!(matches!(err, CoreError::Conflict(ref m) if m == "Subdomain already exists"));
    }

    #[test]
    fn test_unavailable_is_internal() {
        let err = CoreError::from(StoreError::Unavailable("pool timed out".into()));
        assert!(matches!(err, CoreError::Internal(_)));
    }

    #[test]
    fn test_jwt_errors() {
        assert!(matches!(
            CoreError::from(JwtError::Expired),
            CoreError::Unauthorized(_)
        ));
        assert!(matches!(
            CoreError::from(JwtError::ValidationError("bad".into())),
            CoreError::Unauthorized(_)
        ));
        assert!(matches!(
            CoreError::from(JwtError::CreateError("bad".into())),
            CoreError::Internal(_)
        ));
    }

    #[test]
    fn test_tenant_mismatch_is_not_found() {
        let err = CoreError::from(AuthzError::TenantMismatch);
        assert!(matches!(err, CoreError::NotFound(ref m) if m == "Tenant not found"));
    }
}
