/// PostgreSQL store
///
/// Thin adapter from the store traits onto the query methods in
/// [`crate::models`]. Its main job is turning `sqlx` errors into typed
/// [`StoreError`]s: constraint violations are classified by the violated
/// constraint's name, never by the error message.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use super::{StoreError, TodoStore, UniqueField, UserStore};
use crate::models::{
    todo::{Todo, TodoFields},
    user::{CreateUser, User},
};
use crate::pagination::PageRequest;

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Classifies a `sqlx` error
pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(constraint) if constraint.contains("username") => {
                    return StoreError::Conflict(UniqueField::Username);
                }
                Some(constraint) if constraint.contains("email") => {
                    return StoreError::Conflict(UniqueField::Email);
                }
                other => warn!(constraint = ?other, "Unexpected unique violation"),
            }
        }

        if db_err.is_foreign_key_violation() {
            return StoreError::UnknownOwner;
        }
    }

    StoreError::Database(err.to_string())
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let user = User::create(&self.pool, data).await.map_err(classify)?;
        debug!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        User::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        User::find_by_email(&self.pool, email).await.map_err(classify)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        User::email_exists(&self.pool, email).await.map_err(classify)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        User::username_exists(&self.pool, username)
            .await
            .map_err(classify)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::pool::health_check(&self.pool)
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create_todo(&self, owner_id: i64, fields: TodoFields) -> Result<i64, StoreError> {
        let todo = Todo::create(&self.pool, owner_id, fields)
            .await
            .map_err(classify)?;
        debug!(user_id = owner_id, todo_id = todo.id, "Inserted todo");
        Ok(todo.id)
    }

    async fn list_todos(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError> {
        Todo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(classify)
    }

    async fn list_todos_page(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Todo>, i64), StoreError> {
        let todos = Todo::list_page_by_owner(&self.pool, owner_id, page.limit(), page.offset())
            .await
            .map_err(classify)?;
        let total = Todo::count_by_owner(&self.pool, owner_id)
            .await
            .map_err(classify)?;

        Ok((todos, total))
    }

    async fn update_todo(
        &self,
        owner_id: i64,
        id: i64,
        fields: TodoFields,
    ) -> Result<(), StoreError> {
        let updated = Todo::update_owned(&self.pool, id, owner_id, fields)
            .await
            .map_err(classify)?;

        if updated {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }

    async fn delete_todo(&self, owner_id: i64, id: i64) -> Result<(), StoreError> {
        let deleted = Todo::delete_owned(&self.pool, id, owner_id)
            .await
            .map_err(classify)?;

        if deleted {
            Ok(())
        } else {
            Err(StoreError::Forbidden)
        }
    }
}
