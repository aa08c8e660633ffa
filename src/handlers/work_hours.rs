use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::JsonBody;
use crate::handlers::auth::CurrentUser;
use crate::models::{work_hour, WorkHour};
use crate::state::AppState;

// GET /work_hours/
pub async fn list_work_hours(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<WorkHour>>, AppError> {
    let db = state.db()?;
    Ok(Json(queries::list_work_hours(&db, caller.id)?))
}

// POST /work_hours/
pub async fn replace_work_hours(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let blocks = work_hour::parse_week(&body)?;

    let removed = {
        let mut db = state.db()?;
        queries::replace_work_hours(&mut db, caller.id, &blocks)?
    };

    tracing::info!(
        owner_id = caller.id,
        removed,
        inserted = blocks.len(),
        "work hours replaced"
    );
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "status": "updated" })),
    ))
}

// DELETE /work_hours/
pub async fn delete_work_hours(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<StatusCode, AppError> {
    let deleted = {
        let db = state.db()?;
        queries::delete_work_hours(&db, caller.id)?
    };

    if deleted == 0 {
        return Err(AppError::NothingToDelete(
            "No work hours to delete.".to_string(),
        ));
    }

    tracing::info!(owner_id = caller.id, deleted, "work hours deleted");
    Ok(StatusCode::NO_CONTENT)
}
