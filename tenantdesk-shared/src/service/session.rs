/// Session issuer
///
/// Authenticates a (tenant subdomain, email, password) triple and issues a
/// signed session token. Also serves the current-user lookup and logout.
///
/// # Login rules
///
/// 1. Unknown subdomain: `NotFound`
/// 2. Inactive tenant: `Forbidden`
/// 3. No active user with that email in the tenant, or a wrong password:
///    `Unauthorized` with one shared message
///
/// Past the tenant boundary the caller cannot tell which check failed, and a
/// dummy verification keeps the unknown-user path as slow as a real one.
///
/// # Example
///
/// ```no_run
/// use tenantdesk_shared::models::user::LoginRequest;
/// use tenantdesk_shared::service::session::SessionIssuer;
///
/// # async fn example(sessions: SessionIssuer) -> Result<(), Box<dyn std::error::Error>> {
/// let result = sessions
///     .login(LoginRequest {
///         email: "ada@acme.test".to_string(),
///         password: "correct horse".to_string(),
///         tenant_subdomain: "acme".to_string(),
///     })
///     .await?;
///
/// println!("token valid for {}s", result.expires_in);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::guard::Principal;
use crate::auth::jwt::{create_token, Claims, SessionConfig};
use crate::auth::password::CredentialStore;
use crate::error::{CoreError, CoreResult};
use crate::models::tenant::normalize_subdomain;
use crate::models::user::{normalize_email, LoginRequest, UserProfile};
use crate::store::Store;

/// Successful login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user: UserProfile,
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct SessionIssuer {
    store: Arc<dyn Store>,
    credentials: Arc<CredentialStore>,
    session: SessionConfig,
}

impl SessionIssuer {
    pub fn new(
        store: Arc<dyn Store>,
        credentials: Arc<CredentialStore>,
        session: SessionConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            session,
        }
    }

    pub async fn login(&self, mut request: LoginRequest) -> CoreResult<LoginResult> {
        request.tenant_subdomain = normalize_subdomain(&request.tenant_subdomain);
        request.email = normalize_email(&request.email);
        request.validate()?;

        let subdomain = request.tenant_subdomain.as_str();
        let email = request.email.as_str();

        let tenant = self
            .store
            .find_tenant_by_subdomain(subdomain)
            .await?
            .ok_or_else(|| CoreError::not_found("Tenant"))?;

        if !tenant.is_active() {
            info!(tenant_id = %tenant.id, "Login rejected for inactive tenant");
            return Err(CoreError::Forbidden("Tenant is inactive".to_string()));
        }

        let user = match self.store.find_active_user_by_email(tenant.id, email).await? {
            Some(user) => user,
            None => {
                self.credentials.burn_verification(&request.password).await;
                warn!(tenant_id = %tenant.id, "Login failed: unknown or inactive user");
                return Err(CoreError::invalid_credentials());
            }
        };

        if !self
            .credentials
            .verify_blocking(&request.password, &user.password_hash)
            .await
        {
            warn!(tenant_id = %tenant.id, user_id = %user.id, "Login failed: wrong password");
            return Err(CoreError::invalid_credentials());
        }

        let claims = Claims::new(user.id, tenant.id, user.role, self.session.ttl());
        let token = create_token(&claims, &self.session.secret)?;

        info!(tenant_id = %tenant.id, user_id = %user.id, role = user.role.as_str(), "User logged in");

        Ok(LoginResult {
            user: UserProfile::new(user, tenant.summary()),
            token,
            expires_in: self.session.ttl_seconds,
        })
    }

    /// Live profile of the principal
    ///
    /// Re-reads the user and tenant, so a token outliving its user yields
    /// `NotFound`.
    pub async fn current_user(&self, principal: &Principal) -> CoreResult<UserProfile> {
        let user = self
            .store
            .find_user(principal.tenant_id, principal.user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User"))?;

        let tenant = self
            .store
            .find_tenant(principal.tenant_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Tenant"))?;

        Ok(UserProfile::new(user, tenant.summary()))
    }

    /// Revokes the principal's token until its natural expiry
    pub async fn logout(&self, principal: &Principal) -> CoreResult<()> {
        self.store
            .revoke_token(principal.token_id, principal.expires_at)
            .await?;

        info!(user_id = %principal.user_id, tenant_id = %principal.tenant_id, "User logged out");
        Ok(())
    }

    /// Drops blocklist entries whose tokens have expired anyway
    pub async fn purge_expired_revocations(&self) -> CoreResult<u64> {
        Ok(self.store.purge_expired_revocations(Utc::now()).await?)
    }
}
