/// Core services
///
/// Each service receives its store handle at construction. [`Services`]
/// wires them all against one store so a binary or a test only has to pick
/// the backend.
///
/// # Modules
///
/// - [`registry`]: tenant registration, lookup, update and listing
/// - [`session`]: login, current user, logout
/// - [`users`]: tenant user management
/// - [`projects`]: tenant-scoped projects with quota
/// - [`tasks`]: tenant-scoped tasks
/// - [`audit`]: best-effort audit recorder and audit trail reads
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenantdesk_shared::auth::jwt::SessionConfig;
/// use tenantdesk_shared::auth::password::HashingConfig;
/// use tenantdesk_shared::service::Services;
/// use tenantdesk_shared::store::MemoryStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let services = Services::new(
///     Arc::new(MemoryStore::new()),
///     SessionConfig::new("a-signing-secret-of-at-least-32-bytes!"),
///     HashingConfig::default(),
/// )?;
/// # Ok(())
/// # }
/// ```

pub mod audit;
pub mod projects;
pub mod registry;
pub mod session;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use tracing::debug;

use crate::auth::guard::{AuthGuard, Principal};
use crate::auth::jwt::SessionConfig;
use crate::auth::password::{CredentialStore, HashingConfig, PasswordError};
use crate::error::{CoreError, CoreResult};
use crate::store::{Store, StoreResult};

pub use audit::AuditRecorder;
pub use projects::ProjectService;
pub use registry::TenantRegistry;
pub use session::SessionIssuer;
pub use tasks::TaskService;
pub use users::UserService;

/// Confirms the principal's user still exists and is active
///
/// Session tokens are stateless, so writes that record the acting user
/// re-read it first. A deleted or deactivated user gets `Unauthorized`.
pub(crate) async fn ensure_live_actor(store: &dyn Store, principal: &Principal) -> CoreResult<()> {
    match store.find_user(principal.tenant_id, principal.user_id).await? {
        Some(user) if user.is_active => Ok(()),
        _ => {
            debug!(
                user_id = %principal.user_id,
                tenant_id = %principal.tenant_id,
                "Write rejected: acting user deleted or inactive"
            );
            Err(CoreError::Unauthorized("User is no longer active".to_string()))
        }
    }
}

/// All core components sharing one store
#[derive(Clone)]
pub struct Services {
    pub guard: AuthGuard,
    pub registry: TenantRegistry,
    pub sessions: SessionIssuer,
    pub users: UserService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub audit: AuditRecorder,
    store: Arc<dyn Store>,
}

impl Services {
    /// Builds every component on top of `store`
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if the hashing parameters are
    /// rejected
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        session: SessionConfig,
        hashing: HashingConfig,
    ) -> Result<Self, PasswordError> {
        let credentials = Arc::new(CredentialStore::new(hashing)?);
        let audit = AuditRecorder::new(store.clone());
        let guard = AuthGuard::new(store.clone(), session.clone());
        let store: Arc<dyn Store> = store;

        Ok(Self {
            guard,
            registry: TenantRegistry::new(store.clone(), credentials.clone(), audit.clone()),
            sessions: SessionIssuer::new(store.clone(), credentials.clone(), session),
            users: UserService::new(store.clone(), credentials, audit.clone()),
            projects: ProjectService::new(store.clone(), audit.clone()),
            tasks: TaskService::new(store.clone(), audit.clone()),
            audit,
            store,
        })
    }

    /// Store connectivity check
    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }
}
