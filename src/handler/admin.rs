use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        contractordtos::{SaveContractorDto, VettingUpdateDto},
        inspectiondtos::{ApiResponse, AssignJobDto, UpdateJobStatusDto},
        userdtos::{FilterUserDto, UserListResponseDto, UserStatusUpdateDto},
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    views::AdminView,
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/:id/status", put(update_user_status))
        .route("/contractors", get(get_contractors).post(save_contractor))
        .route("/contractors/:id", get(get_contractor).delete(remove_contractor))
        .route("/contractors/:id/vetting", put(update_vetting_status))
        .route("/inspections", get(get_inspections))
        .route("/inspections/:id/status", put(update_job_status))
        .route("/inspections/:id/assign", put(assign_job))
        .route("/inspections/:id/override", put(override_job_status))
        .route("/dashboard", get(get_dashboard))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }))
}

pub async fn get_users(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let users = view.users().await?;

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        users: FilterUserDto::filter_users(&users),
        results: users.len(),
    }))
}

pub async fn update_user_status(
    Path(user_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UserStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let user = view.set_user_status(&user_id, body.status).await?;

    Ok(Json(ApiResponse::success(
        "User status updated",
        FilterUserDto::filter_user(&user),
    )))
}

pub async fn get_contractors(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let contractors = view.contractors().await?;

    Ok(Json(ApiResponse::success(
        "Contractors retrieved successfully",
        contractors.to_vec(),
    )))
}

pub async fn get_contractor(
    Path(contractor_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let contractor = view.contractor(&contractor_id).await?;

    Ok(Json(ApiResponse::success("Contractor retrieved", contractor)))
}

pub async fn save_contractor(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<SaveContractorDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let contractor = view.save_contractor(body).await?;

    Ok(Json(ApiResponse::success("Contractor profile saved", contractor)))
}

pub async fn remove_contractor(
    Path(contractor_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let contractor = view.remove_contractor(&contractor_id).await?;

    Ok(Json(ApiResponse::success("Contractor profile removed", contractor)))
}

pub async fn update_vetting_status(
    Path(contractor_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<VettingUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let contractor = view
        .set_vetting_status(&contractor_id, body.vetting_status)
        .await?;

    Ok(Json(ApiResponse::success("Vetting status updated", contractor)))
}

pub async fn get_inspections(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let inspections = view.inspections().await?;

    Ok(Json(ApiResponse::success(
        "Inspections retrieved successfully",
        inspections.to_vec(),
    )))
}

pub async fn update_job_status(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateJobStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let job = view.update_job_status(&job_id, body.status).await?;

    Ok(Json(ApiResponse::success("Job status updated", job)))
}

pub async fn assign_job(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<AssignJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let job = view.assign_job(&job_id, &body.contractor_id).await?;

    Ok(Json(ApiResponse::success("Job assigned", job)))
}

pub async fn override_job_status(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateJobStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let job = view.override_job_status(&job_id, body.status).await?;

    Ok(Json(ApiResponse::success("Job status overridden", job)))
}

pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = AdminView::new(&app_state.coordinator, auth.user)?;
    let dashboard = view.dashboard().await?;

    Ok(Json(ApiResponse::success("Dashboard retrieved", dashboard)))
}
