/// Todo model and database operations
///
/// Every todo belongs to exactly one user. All queries in this module take
/// the owner's ID and filter on it, so a caller can never observe or touch a
/// row owned by someone else.
///
/// # Lifecycle
///
/// ```text
/// created → updated* → deleted
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     priority todo_priority NOT NULL DEFAULT 'medium',
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

/// Todo priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only the exact lowercase names parse.
impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(()),
        }
    }
}

/// Todo item owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo ID
    pub id: i64,

    /// Non-empty title, at most 255 characters
    pub title: String,

    pub completed: bool,

    pub priority: Priority,

    /// Owning user
    pub user_id: i64,

    pub created_at: DateTime<Utc>,

    /// Bumped on every update
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a todo
///
/// Used for both creation and update. Updates replace all three fields;
/// there are no partial updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
}

impl Todo {
    /// Inserts a todo owned by `user_id`
    ///
    /// # Errors
    ///
    /// Fails with a foreign-key violation if `user_id` does not reference an
    /// existing user.
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        fields: TodoFields,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, completed, priority, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, completed, priority, user_id, created_at, updated_at
            "#,
        )
        .bind(fields.title)
        .bind(fields.completed)
        .bind(fields.priority)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Lists every todo owned by `user_id`, oldest first
    pub async fn list_by_owner(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, completed, priority, user_id, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Lists one page of todos owned by `user_id`, oldest first
    pub async fn list_page_by_owner(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, completed, priority, user_id, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts todos owned by `user_id`
    pub async fn count_by_owner(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Replaces the mutable fields of a todo owned by `user_id`
    ///
    /// # Returns
    ///
    /// `false` if no todo with this ID belongs to `user_id`
    pub async fn update_owned(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        fields: TodoFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $1, completed = $2, priority = $3, updated_at = NOW()
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(fields.title)
        .bind(fields.completed)
        .bind(fields.priority)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a todo owned by `user_id`
    ///
    /// # Returns
    ///
    /// `false` if no todo with this ID belongs to `user_id`
    pub async fn delete_owned(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
