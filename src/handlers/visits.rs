//! Appointment and job endpoints.
//!
//! Both resources share one set of handlers; the [`VisitKind`] bound into each
//! route picks the table and the not-found message.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::Value;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::JsonBody;
use crate::models::{NewVisit, Visit, VisitKind, VisitPatch};
use crate::state::AppState;

pub fn routes(kind: VisitKind) -> Router<Arc<AppState>> {
    let base = format!("/{}", kind.table());

    Router::new()
        .route(
            &format!("{base}/"),
            get(move |State(state): State<Arc<AppState>>| list(state, kind)),
        )
        .route(
            &format!("{base}/create/"),
            post(
                move |State(state): State<Arc<AppState>>, JsonBody(body): JsonBody<Value>| {
                    create(state, kind, body)
                },
            ),
        )
        .route(
            &format!("{base}/:id/details/"),
            get(
                move |State(state): State<Arc<AppState>>, Path(id): Path<String>| {
                    details(state, kind, id)
                },
            ),
        )
        .route(
            &format!("{base}/:id/update/"),
            put(
                move |State(state): State<Arc<AppState>>,
                      Path(id): Path<String>,
                      JsonBody(body): JsonBody<Value>| update(state, kind, id, body, false),
            )
            .patch(
                move |State(state): State<Arc<AppState>>,
                      Path(id): Path<String>,
                      JsonBody(body): JsonBody<Value>| update(state, kind, id, body, true),
            ),
        )
        .route(
            &format!("{base}/:id/"),
            delete(
                move |State(state): State<Arc<AppState>>, Path(id): Path<String>| {
                    remove(state, kind, id)
                },
            ),
        )
}

// GET /{kind}/
pub async fn list(state: Arc<AppState>, kind: VisitKind) -> Result<Json<Vec<Visit>>, AppError> {
    let visits = {
        let db = state.db()?;
        queries::list_visits(&db, kind)?
    };
    Ok(Json(visits))
}

// POST /{kind}/create/
pub async fn create(
    state: Arc<AppState>,
    kind: VisitKind,
    body: Value,
) -> Result<(StatusCode, Json<Visit>), AppError> {
    let new = NewVisit::from_json(&body)?;

    let visit = {
        let db = state.db()?;
        queries::create_visit(&db, kind, &new)?
    };

    tracing::info!(id = visit.id, kind = kind.label(), "visit created");
    Ok((StatusCode::CREATED, Json(visit)))
}

// GET /{kind}/:id/details/
pub async fn details(
    state: Arc<AppState>,
    kind: VisitKind,
    raw_id: String,
) -> Result<Json<Visit>, AppError> {
    let db = state.db()?;
    let visit = find(&db, kind, &raw_id)?;
    Ok(Json(visit))
}

// PUT | PATCH /{kind}/:id/update/
pub async fn update(
    state: Arc<AppState>,
    kind: VisitKind,
    raw_id: String,
    body: Value,
    partial: bool,
) -> Result<Json<Visit>, AppError> {
    let db = state.db()?;
    let mut visit = find(&db, kind, &raw_id)?;

    let patch = if partial {
        VisitPatch::from_json(&body)?
    } else {
        VisitPatch::from(NewVisit::from_json(&body)?)
    };
    patch.apply(&mut visit);

    if !queries::update_visit(&db, kind, &visit)? {
        return Err(AppError::NotFound(kind.not_found()));
    }

    tracing::info!(id = visit.id, kind = kind.label(), partial, "visit updated");
    Ok(Json(visit))
}

// DELETE /{kind}/:id/
pub async fn remove(
    state: Arc<AppState>,
    kind: VisitKind,
    raw_id: String,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&raw_id).ok_or_else(|| AppError::NotFound(kind.not_found()))?;

    let deleted = {
        let db = state.db()?;
        queries::delete_visit(&db, kind, id)?
    };

    if !deleted {
        return Err(AppError::NotFound(kind.not_found()));
    }

    tracing::info!(id, kind = kind.label(), "visit deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn find(db: &rusqlite::Connection, kind: VisitKind, raw_id: &str) -> Result<Visit, AppError> {
    let id = parse_id(raw_id).ok_or_else(|| AppError::NotFound(kind.not_found()))?;
    queries::get_visit(db, kind, id)?.ok_or_else(|| AppError::NotFound(kind.not_found()))
}

/// Only plain digit strings name a row; signs and whitespace do not.
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
