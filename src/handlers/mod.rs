pub mod auth;
pub mod health;
pub mod services;
pub mod visits;
pub mod work_hours;

use std::sync::Arc;

use axum::extract::FromRequest;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::models::VisitKind;
use crate::state::AppState;

/// `axum::Json` whose rejections (bad syntax, wrong content type) render as
/// JSON error bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(visits::routes(VisitKind::Appointment))
        .merge(visits::routes(VisitKind::Job))
        .route(
            "/services/",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/:id/",
            get(services::get_service)
                .put(services::replace_service)
                .patch(services::patch_service)
                .delete(services::delete_service),
        )
        .route(
            "/work_hours/",
            get(work_hours::list_work_hours)
                .post(work_hours::replace_work_hours)
                .delete(work_hours::delete_work_hours),
        )
        .route("/register/", post(auth::register))
        .route("/token/", post(auth::obtain_token))
        .route("/token/refresh/", post(auth::refresh_token))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
