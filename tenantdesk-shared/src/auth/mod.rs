/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id credential store
/// - [`jwt`]: session token signing and validation
/// - [`guard`]: bearer token authentication into a [`guard::Principal`]
/// - [`authorization`]: role capability table and tenant scoping
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory and 3 passes by default
/// - **Session Tokens**: HS256, 24 hour lifetime, unique `jti` per login
/// - **Logout**: revoked `jti`s are rejected until the token would expire anyway
/// - **Constant-time Comparison**: password checks go through argon2's verifier
///
/// # Example
///
/// ```
/// use tenantdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use tenantdesk_shared::auth::password::{CredentialStore, HashingConfig};
/// use tenantdesk_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialStore::new(HashingConfig::default())?;
/// let digest = credentials.hash("user_password")?;
/// assert!(credentials.verify("user_password", &digest));
///
/// let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), Role::User, Duration::hours(24));
/// let token = create_token(&claims, "a-signing-secret-of-at-least-32-bytes!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod guard;
pub mod jwt;
pub mod password;

pub use authorization::{Action, AuthzError};
pub use guard::{AuthGuard, Principal, RequestContext};
