/// Storage traits and implementations
///
/// Components receive their storage as `Arc<dyn UserStore>` /
/// `Arc<dyn TodoStore>` at construction time. There is no global handle.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via `sqlx`
/// - [`memory::MemoryStore`]: in-process maps, for tests and database-less runs
///
/// Both enforce the same invariants: unique usernames and emails, todos
/// scoped to their owner, ascending-ID listing order.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;

use crate::models::{
    todo::{Todo, TodoFields},
    user::{CreateUser, User},
};
use crate::pagination::PageRequest;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Column protected by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("{0} already exists")]
    Conflict(UniqueField),

    /// The referenced owner does not exist
    #[error("owner does not exist")]
    UnknownOwner,

    /// No row with this ID belongs to the caller
    #[error("todo not found or not owned by user")]
    Forbidden,

    /// Backing store failure
    #[error("database error: {0}")]
    Database(String),
}

/// User records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user
    ///
    /// Fails with `StoreError::Conflict` when the username or email is taken,
    /// even if an earlier existence check passed.
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Round-trips to the backing store
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Todos, every operation scoped to an owning user
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Creates a todo owned by `owner_id` and returns its ID
    ///
    /// Fails with `StoreError::UnknownOwner` if the owner does not exist.
    async fn create_todo(&self, owner_id: i64, fields: TodoFields) -> Result<i64, StoreError>;

    /// All todos owned by `owner_id`, ascending by ID
    async fn list_todos(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError>;

    /// One page of todos owned by `owner_id` plus the owner's total count
    async fn list_todos_page(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Todo>, i64), StoreError>;

    /// Replaces title, completed and priority, bumping `updated_at`
    ///
    /// Fails with `StoreError::Forbidden` if `id` is not owned by `owner_id`,
    /// whether or not it exists.
    async fn update_todo(&self, owner_id: i64, id: i64, fields: TodoFields)
        -> Result<(), StoreError>;

    /// Removes a todo
    ///
    /// Same ownership semantics as [`TodoStore::update_todo`].
    async fn delete_todo(&self, owner_id: i64, id: i64) -> Result<(), StoreError>;
}
