/// In-process store
///
/// Mirrors the PostgreSQL schema closely enough to run the whole service
/// without a database: sequential IDs, column length limits and unique
/// usernames and emails checked at insert time, todos that must reference an existing user, and
/// owner-filtered queries.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{StoreError, TodoStore, UniqueField, UserStore};
use crate::models::{
    todo::{Todo, TodoFields},
    user::{CreateUser, User},
};
use crate::pagination::PageRequest;
use crate::validation::{EMAIL_MAX_CHARS, USERNAME_MAX_CHARS};

/// Rejects values that would overflow a `VARCHAR(max)` column
fn check_column(value: &str, max: usize) -> Result<(), StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::Database(format!(
            "value too long for type character varying({})",
            max
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    todos: BTreeMap<i64, Todo>,
    next_user_id: i64,
    next_todo_id: i64,
}

impl Tables {
    fn owned_todos(&self, owner_id: i64) -> impl Iterator<Item = &Todo> {
        self.todos.values().filter(move |todo| todo.user_id == owner_id)
    }
}

/// Store keeping all rows in memory
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        check_column(&data.username, USERNAME_MAX_CHARS)?;
        check_column(&data.email, EMAIL_MAX_CHARS)?;

        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        if tables.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            username: data.username,
            email: data.email,
            password: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.username == username))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create_todo(&self, owner_id: i64, fields: TodoFields) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&owner_id) {
            return Err(StoreError::UnknownOwner);
        }

        tables.next_todo_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: tables.next_todo_id,
            title: fields.title,
            completed: fields.completed,
            priority: fields.priority,
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        let id = todo.id;
        tables.todos.insert(id, todo);

        Ok(id)
    }

    async fn list_todos(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.owned_todos(owner_id).cloned().collect())
    }

    async fn list_todos_page(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Todo>, i64), StoreError> {
        let tables = self.tables.read().await;

        let total = tables.owned_todos(owner_id).count() as i64;
        let todos = tables
            .owned_todos(owner_id)
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok((todos, total))
    }

    async fn update_todo(
        &self,
        owner_id: i64,
        id: i64,
        fields: TodoFields,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        let todo = tables
            .todos
            .get_mut(&id)
            .filter(|todo| todo.user_id == owner_id)
            .ok_or(StoreError::Forbidden)?;

        todo.title = fields.title;
        todo.completed = fields.completed;
        todo.priority = fields.priority;
        // Strictly increasing at TIMESTAMPTZ (microsecond) resolution
        todo.updated_at = Utc::now().max(todo.updated_at + Duration::microseconds(1));

        Ok(())
    }

    async fn delete_todo(&self, owner_id: i64, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        match tables.todos.get(&id) {
            Some(todo) if todo.user_id == owner_id => {
                tables.todos.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::Forbidden),
        }
    }
}
