use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::handlers::JsonBody;
use crate::models::{Credentials, User};
use crate::services::identity;
use crate::services::tokens::TokenPair;
use crate::state::AppState;
use crate::validation::{self, FieldErrors, Presence, TextRule};

/// The user behind a verified `Authorization: Bearer <access>` header.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized(identity::MISSING_CREDENTIALS.to_string()))?;

        identity::resolve_caller(state, token).map(CurrentUser)
    }
}

// POST /register/
#[derive(Serialize)]
pub struct RegisterResponse {
    id: i64,
    username: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let creds = Credentials::for_registration(&body)?;
    let user = identity::register(&state, creds)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

// POST /token/
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<TokenPair>, AppError> {
    let creds = Credentials::for_login(&body)?;
    let pair = identity::obtain_tokens(&state, &creds)?;
    Ok(Json(pair))
}

// POST /token/refresh/
#[derive(Serialize)]
pub struct RefreshResponse {
    access: String,
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<RefreshResponse>, AppError> {
    let obj = validation::object(&body)?;
    let mut errors = FieldErrors::new();
    let refresh = validation::text(
        obj,
        "refresh",
        Presence::Required,
        TextRule::secret(),
        &mut errors,
    )
    .ok_or(AppError::Validation(errors))?;

    let access = identity::refresh_access(&state, &refresh)?;
    Ok(Json(RefreshResponse { access }))
}
