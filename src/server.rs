//! HTTP surface over the task store: the engine's operations as a small JSON
//! API, one route per operation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{Result, SprigError};
use crate::model::{Completion, Task, TaskNode};
use crate::store::tasks::TaskStore;

#[derive(Deserialize)]
struct CreateRequest {
    title: String,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    position: Option<usize>,
}

#[derive(Deserialize)]
struct ReorderRequest {
    order: Vec<String>,
}

#[derive(Deserialize)]
struct MoveRequest {
    task_id: String,
    #[serde(default)]
    parent_id: Option<String>,
    position: usize,
}

#[derive(Deserialize)]
struct DueQuery {
    #[serde(default)]
    on: Option<NaiveDate>,
}

pub fn router(store: Arc<TaskStore>) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", delete(delete_task))
        .route("/api/tasks/{id}/complete", post(complete_task))
        .route("/api/tasks/reorder", post(reorder_tasks))
        .route("/api/tasks/move", post(move_task))
        .route("/api/tasks/due", get(due_tasks))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(store)
}

pub async fn serve(store: TaskStore, addr: SocketAddr) -> Result<()> {
    let app = router(Arc::new(store));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "serving task api");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list_tasks(State(store): State<Arc<TaskStore>>) -> ApiResult<Json<Vec<TaskNode>>> {
    Ok(Json(store.list(None)?))
}

async fn create_task(
    State(store): State<Arc<TaskStore>>,
    Json(payload): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = store.create(&payload.title, payload.parent_id.as_deref(), payload.position)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    store.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Completion>> {
    let completion = store.complete(&id, Local::now().date_naive())?;
    Ok(Json(completion))
}

async fn reorder_tasks(
    State(store): State<Arc<TaskStore>>,
    Json(payload): Json<ReorderRequest>,
) -> ApiResult<Json<Vec<TaskNode>>> {
    Ok(Json(store.reorder(&payload.order)?))
}

async fn move_task(
    State(store): State<Arc<TaskStore>>,
    Json(payload): Json<MoveRequest>,
) -> ApiResult<Json<Vec<TaskNode>>> {
    Ok(Json(store.move_task(
        &payload.task_id,
        payload.parent_id.as_deref(),
        payload.position,
    )?))
}

async fn due_tasks(
    State(store): State<Arc<TaskStore>>,
    Query(query): Query<DueQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let date = query.on.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(store.due_on_or_before(date)?))
}

type ApiResult<T> = std::result::Result<T, ApiError>;

struct ApiError(SprigError);

impl From<SprigError> for ApiError {
    fn from(err: SprigError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = serde_json::json!({
            "error": self.0.code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

fn status_for(err: &SprigError) -> StatusCode {
    match err {
        SprigError::TaskNotFound(_) | SprigError::ParentNotFound(_) => StatusCode::NOT_FOUND,
        SprigError::TaskIdAmbiguous(_, _)
        | SprigError::EmptyTitle
        | SprigError::SelfParent(_)
        | SprigError::MoveCycle(_)
        | SprigError::ReorderMismatch
        | SprigError::HasSubtasks(_)
        | SprigError::BadRecurrence(_)
        | SprigError::BadDateExpr(_) => StatusCode::BAD_REQUEST,
        SprigError::CorruptStore(_) | SprigError::Io(_) | SprigError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
