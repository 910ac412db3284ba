/// Credential store using Argon2id
///
/// Hashes and verifies user passwords. Plaintext never leaves this module
/// and digests are only ever compared, never decoded.
///
/// # Security
///
/// - **Algorithm**: Argon2id, version 0x13
/// - **Default cost**: 64 MB memory, 3 passes, 4 lanes (see [`HashingConfig`])
/// - **Salt**: 16 random bytes per hash from the OS RNG
/// - **Comparison**: constant-time, inside `argon2`'s verifier
///
/// The cost parameters are embedded in every digest, so hashes created under
/// older settings keep verifying after the configuration changes.
///
/// # Example
///
/// ```
/// use tenantdesk_shared::auth::password::{CredentialStore, HashingConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialStore::new(HashingConfig::default())?;
///
/// let digest = credentials.hash("correct horse battery staple")?;
/// assert!(credentials.verify("correct horse battery staple", &digest));
/// assert!(!credentials.verify("wrong", &digest));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use tracing::{error, warn};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Cost parameters were rejected by argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Hashes and verifies passwords with fixed Argon2id parameters
#[derive(Clone)]
pub struct CredentialStore {
    argon2: Argon2<'static>,

    /// Digest of a throwaway password, verified against when an account is
    /// missing so both login paths cost the same
    dummy_digest: String,
}

impl CredentialStore {
    /// Creates a credential store with the given cost parameters
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the parameters
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(config.memory_kib)
            .t_cost(config.iterations)
            .p_cost(config.parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let mut store = Self {
            argon2,
            dummy_digest: String::new(),
        };
        store.dummy_digest = store.hash("tenantdesk-dummy-credential")?;

        Ok(store)
    }

    /// Hashes a plaintext password
    ///
    /// # Returns
    ///
    /// PHC string, e.g. `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if hashing fails
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(digest.to_string())
    }

    /// Verifies a plaintext password against a stored digest
    ///
    /// Never fails: a mismatch, a malformed digest or any other verifier
    /// error all return `false`. Malformed digests are logged since they
    /// indicate corrupted data rather than a wrong password.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = %e, "Stored password digest is malformed");
                return false;
            }
        };

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    ///
    /// Argon2id at the default cost takes long enough to stall an async
    /// worker thread, so request paths use this variant.
    pub async fn hash_blocking(&self, plaintext: &str) -> Result<String, PasswordError> {
        let store = self.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || store.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_blocking(&self, plaintext: &str, digest: &str) -> bool {
        let store = self.clone();
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();

        match tokio::task::spawn_blocking(move || store.verify(&plaintext, &digest)).await {
            Ok(verified) => verified,
            Err(e) => {
                error!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Runs a verification whose result is discarded
    ///
    /// Called on the unknown-account path of login so response timing does
    /// not reveal whether the account exists.
    pub async fn burn_verification(&self, plaintext: &str) {
        let _ = self.verify_blocking(plaintext, &self.dummy_digest).await;
    }
}
