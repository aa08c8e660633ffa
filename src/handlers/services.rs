use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::JsonBody;
use crate::handlers::auth::CurrentUser;
use crate::handlers::visits::parse_id;
use crate::models::{NewService, Service, ServicePatch};
use crate::state::AppState;

const NOT_FOUND: &str = "Service not found";

// GET /services/
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<Service>>, AppError> {
    let db = state.db()?;
    Ok(Json(queries::list_services(&db, caller.id)?))
}

// POST /services/
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let new = NewService::from_json(&body)?;

    let service = {
        let db = state.db()?;
        queries::create_service(&db, caller.id, &new)?
    };

    tracing::info!(id = service.id, owner_id = caller.id, "service created");
    Ok((StatusCode::CREATED, Json(service)))
}

// GET /services/:id/
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Service>, AppError> {
    let db = state.db()?;
    Ok(Json(find_owned(&db, caller.id, &raw_id)?))
}

// PUT /services/:id/
pub async fn replace_service(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Service>, AppError> {
    update(&state, caller.id, &raw_id, &body, false)
}

// PATCH /services/:id/
pub async fn patch_service(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Service>, AppError> {
    update(&state, caller.id, &raw_id, &body, true)
}

// DELETE /services/:id/
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&raw_id).ok_or_else(not_found)?;

    let deleted = {
        let db = state.db()?;
        queries::delete_service(&db, caller.id, id)?
    };
    if !deleted {
        return Err(not_found());
    }

    tracing::info!(id, owner_id = caller.id, "service deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn update(
    state: &AppState,
    owner_id: i64,
    raw_id: &str,
    body: &Value,
    partial: bool,
) -> Result<Json<Service>, AppError> {
    let db = state.db()?;
    let mut service = find_owned(&db, owner_id, raw_id)?;

    let patch = if partial {
        ServicePatch::from_json(body)?
    } else {
        ServicePatch::from(NewService::from_json(body)?)
    };
    patch.apply(&mut service);

    if !queries::update_service(&db, &service)? {
        return Err(not_found());
    }

    tracing::info!(id = service.id, owner_id, partial, "service updated");
    Ok(Json(service))
}

/// Another owner's service is indistinguishable from a missing one.
fn find_owned(db: &rusqlite::Connection, owner_id: i64, raw_id: &str) -> Result<Service, AppError> {
    let id = parse_id(raw_id).ok_or_else(not_found)?;
    queries::get_service(db, owner_id, id)?.ok_or_else(not_found)
}

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}
