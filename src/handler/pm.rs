use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::inspectiondtos::{
        ApiResponse, CreateInspectionDto, EditInspectionDto, InspectionQueryDto, RepairItemDto,
        RepriceRepairDto,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    views::PmView,
    AppState,
};

pub fn pm_handler() -> Router {
    Router::new()
        .route(
            "/inspections",
            get(get_inspections).post(create_inspection),
        )
        .route("/inspections/:id", get(get_inspection).put(edit_inspection))
        .route("/inspections/:id/repairs", post(add_repair))
        .route(
            "/inspections/:id/repairs/:repair_id",
            put(reprice_repair).delete(remove_repair),
        )
        .route("/contractors/count", get(get_contractor_count))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::PropertyManager])
        }))
}

pub async fn get_inspections(
    Query(query_params): Query<InspectionQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;

    let inspections = view
        .inspections_by_pm(query_params.pm_name.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(
        "Inspections retrieved successfully",
        inspections,
    )))
}

pub async fn create_inspection(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateInspectionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let inspection = view.create_inspection(body).await?;

    Ok(Json(ApiResponse::success(
        "Inspection created successfully",
        inspection,
    )))
}

pub async fn get_inspection(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let inspection = view.inspection(&job_id).await?;

    Ok(Json(ApiResponse::success(
        "Inspection retrieved successfully",
        inspection,
    )))
}

pub async fn edit_inspection(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<EditInspectionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let inspection = view.edit_inspection(&job_id, body).await?;

    Ok(Json(ApiResponse::success(
        "Inspection updated successfully",
        inspection,
    )))
}

pub async fn add_repair(
    Path(job_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<RepairItemDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let inspection = view.add_repair(&job_id, body).await?;

    Ok(Json(ApiResponse::success("Repair item added", inspection)))
}

pub async fn reprice_repair(
    Path((job_id, repair_id)): Path<(String, String)>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<RepriceRepairDto>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let inspection = view.reprice_repair(&job_id, &repair_id, body).await?;

    Ok(Json(ApiResponse::success("Repair item repriced", inspection)))
}

pub async fn remove_repair(
    Path((job_id, repair_id)): Path<(String, String)>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let inspection = view.remove_repair(&job_id, &repair_id).await?;

    Ok(Json(ApiResponse::success("Repair item removed", inspection)))
}

pub async fn get_contractor_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let view = PmView::new(&app_state.coordinator, auth.user)?;
    let count = view.contractor_count().await?;

    Ok(Json(ApiResponse::success("Contractor count retrieved", count)))
}
