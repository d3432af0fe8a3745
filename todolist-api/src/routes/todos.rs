/// Todo endpoints
///
/// Every handler takes the caller's [`AuthContext`] and passes its user ID
/// to the store, which scopes reads and writes to that owner. Any `id` or
/// `user_id` in a request body is ignored.
///
/// # Endpoints
///
/// - `GET /todos` - All own todos, or one page with `?page=N&pageSize=M`
/// - `POST /todos` - Create a todo
/// - `PUT /todos/:id` - Replace title, completed and priority
/// - `DELETE /todos/:id` - Delete a todo
///
/// Updating or deleting a todo that does not exist and one owned by another
/// user both yield `403 Forbidden`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use todolist_shared::{
    auth::middleware::AuthContext,
    models::todo::Todo,
    pagination::{PageRequest, Pagination},
    validation::TodoPayload,
};
use tracing::{debug, info};

/// Query parameters for listing
///
/// Kept as raw strings so that unparseable values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,

    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Listing response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TodoList {
    /// Plain array, without a `page` parameter
    All(Vec<Todo>),

    /// Paginated envelope
    Page {
        todos: Vec<Todo>,
        pagination: Pagination,
    },
}

/// Body returned by create, update and delete
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

/// List the caller's todos
///
/// A non-empty `page` parameter switches to the paginated envelope:
///
/// ```json
/// {
///   "todos": [...],
///   "pagination": { "page": 1, "pageSize": 10, "total": 25, "totalPages": 3 }
/// }
/// ```
pub async fn list_todos(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<TodoList>> {
    let paginated = query.page.as_deref().is_some_and(|page| !page.is_empty());

    if !paginated {
        let todos = state.todos.list_todos(auth.user_id).await?;
        debug!(user_id = auth.user_id, count = todos.len(), "Listed todos");
        return Ok(Json(TodoList::All(todos)));
    }

    let page = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref());
    let (todos, total) = state.todos.list_todos_page(auth.user_id, page).await?;
    let pagination = page.paginate(total);

    debug!(
        user_id = auth.user_id,
        count = todos.len(),
        page = pagination.page,
        total_pages = pagination.total_pages,
        "Listed todo page"
    );

    Ok(Json(TodoList::Page { todos, pagination }))
}

/// Create a todo owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let Json(payload) = payload?;
    let fields = payload.into_fields().map_err(ApiError::ValidationError)?;

    let id = state.todos.create_todo(auth.user_id, fields).await?;

    info!(user_id = auth.user_id, todo_id = id, "Created todo");

    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

/// Replace a todo's mutable fields
///
/// # Errors
///
/// - `400 Bad Request`: Invalid ID, malformed body or validation failed
/// - `403 Forbidden`: No such todo owned by the caller
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> ApiResult<Json<IdResponse>> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let fields = payload.into_fields().map_err(ApiError::ValidationError)?;

    state.todos.update_todo(auth.user_id, id, fields).await?;

    info!(user_id = auth.user_id, todo_id = id, "Updated todo");

    Ok(Json(IdResponse { id }))
}

/// Delete a todo
///
/// # Errors
///
/// - `400 Bad Request`: Invalid ID
/// - `403 Forbidden`: No such todo owned by the caller
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<IdResponse>> {
    let id = parse_id(&id)?;

    state.todos.delete_todo(auth.user_id, id).await?;

    info!(user_id = auth.user_id, todo_id = id, "Deleted todo");

    Ok(Json(IdResponse { id }))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|e| {
        debug!(id = raw, error = %e, "Invalid todo ID");
        ApiError::BadRequest("Invalid todo ID".to_string())
    })
}
