use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};

use crate::{
    dtos::inspectiondtos::{ApiResponse, JobListQueryDto, UpdateJobStatusDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    views::ContractorView,
    AppState,
};

pub fn contractor_handler() -> Router {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/jobs", get(get_jobs))
        .route("/jobs/:id/accept", put(accept_job))
        .route("/jobs/:id/status", put(update_job_status))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Contractor])
        }))
}

pub async fn get_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = ContractorView::new(&app_state.coordinator, auth.user)?;
    let profile = view.profile().await?;

    Ok(Json(ApiResponse::success("Profile retrieved", profile)))
}

pub async fn get_jobs(
    Query(query_params): Query<JobListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = ContractorView::new(&app_state.coordinator, auth.user)?;

    let jobs = view.jobs(query_params.scope.unwrap_or_default()).await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn accept_job(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = ContractorView::new(&app_state.coordinator, auth.user)?;
    let job = view.accept_job(&job_id).await?;

    Ok(Json(ApiResponse::success("Job accepted", job)))
}

pub async fn update_job_status(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateJobStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = ContractorView::new(&app_state.coordinator, auth.user)?;
    let job = view.update_job_status(&job_id, body.status).await?;

    Ok(Json(ApiResponse::success("Job status updated", job)))
}
