/// Credential store
///
/// Registration, login and user lookup on top of a [`UserStore`].
///
/// # Registration race
///
/// `register` checks for an existing email and username before inserting,
/// but the check and the insert are separate round-trips. Two concurrent
/// registrations with the same credentials can both pass the check; the
/// loser then hits the storage uniqueness constraint, which surfaces here as
/// the same `AccountError::Conflict` the check would have produced.

use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::password::{PasswordError, PasswordHasher};
use crate::models::user::{CreateUser, User};
use crate::store::{StoreError, UniqueField, UserStore};

/// Error type for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Username or email already registered
    #[error("{0} already exists")]
    Conflict(UniqueField),

    /// Unknown email or wrong password; deliberately not distinguished
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => AccountError::Conflict(field),
            other => AccountError::Store(other),
        }
    }
}

/// User registration and authentication
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    /// Creates a credential store with the default Argon2id cost
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self::with_hasher(users, PasswordHasher::default())
    }

    pub fn with_hasher(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Registers a new user
    ///
    /// The password is hashed before it reaches storage.
    ///
    /// # Errors
    ///
    /// - `AccountError::Conflict` if the email or username is taken
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AccountError> {
        if self.users.email_exists(email).await? {
            debug!("Registration rejected: email taken");
            return Err(AccountError::Conflict(UniqueField::Email));
        }
        if self.users.username_exists(username).await? {
            debug!("Registration rejected: username taken");
            return Err(AccountError::Conflict(UniqueField::Username));
        }

        let password_hash = self.hash(password).await?;

        let user = self
            .users
            .insert_user(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "Registered user");
        Ok(user)
    }

    /// Authenticates by email and password
    ///
    /// # Errors
    ///
    /// - `AccountError::InvalidCredentials` for an unknown email or a wrong
    ///   password alike
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let Some(user) = self.users.find_user_by_email(email).await? else {
            debug!("Login rejected: unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.verify(password, &user.password).await? {
            debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Looks up a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<User, AccountError> {
        self.users
            .find_user_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// Runs Argon2 off the async executor
    async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Hash(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::Verify(format!("Verification task failed: {}", e)))?
    }
}
