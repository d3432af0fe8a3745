/// Password hashing using Argon2id
///
/// Passwords are hashed once at registration and compared at login. Only the
/// PHC-formatted hash ever reaches storage.
///
/// # Security
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Salt**: 16 random bytes from the OS RNG, embedded in the hash
///
/// Verification reads the parameters back out of the stored hash, so hashes
/// produced with different costs remain verifiable.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::password::PasswordHasher;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::with_params(1024, 1, 1)?;
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash)?);
/// assert!(!hasher.verify("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Argon2, Params, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// Stored hash could not be parsed
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a wrong password
    #[error("Failed to verify password: {0}")]
    Verify(String),
}

/// Argon2id hasher with fixed cost parameters
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        let params = ParamsBuilder::new()
            .m_cost(65536) // 64 MB
            .t_cost(3) // 3 iterations
            .p_cost(4) // 4 parallelism
            .output_len(32)
            .build()
            .unwrap_or_default();

        Self { params }
    }
}

impl PasswordHasher {
    /// Creates a hasher with custom cost parameters
    ///
    /// # Arguments
    ///
    /// * `m_cost` - Memory in KiB
    /// * `t_cost` - Number of passes
    /// * `p_cost` - Degree of parallelism
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(m_cost)
            .t_cost(t_cost)
            .p_cost(p_cost)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::Hash(format!("Invalid parameters: {}", e)))?;

        Ok(Self { params })
    }

    /// Hashes a plaintext password
    ///
    /// # Returns
    ///
    /// PHC string, e.g. `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(format!("Hash generation failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash
    ///
    /// The comparison is constant-time.
    ///
    /// # Returns
    ///
    /// `Ok(true)` on match, `Ok(false)` on mismatch
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Verify(format!("Verification failed: {}", e))),
        }
    }
}
