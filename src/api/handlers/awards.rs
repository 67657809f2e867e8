use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::entities::awards;
use crate::services::award_service::{AwardDetail, CreateAwardInput, UpdateAwardInput};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAwardInput>,
) -> Result<(StatusCode, Json<ApiResponse<awards::Model>>), AppError> {
    let award = state.awards.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Award added successfully", award)),
    ))
}

pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<awards::Model>>>, AppError> {
    let awards = state.awards.find_all().await?;
    Ok(Json(ApiResponse::list(
        "Awards retrieved successfully!",
        awards,
    )))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AwardDetail>>, AppError> {
    let award = state.awards.find_one(&id).await?;
    Ok(Json(ApiResponse::new("Award retrieved successfully", award)))
}

pub async fn find_by_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<awards::Model>>>, AppError> {
    let awards = state.awards.find_by_profile(&id).await?;
    Ok(Json(ApiResponse::list(
        "Awards retrieved successfully",
        awards,
    )))
}

pub async fn download_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<awards::Model>>, AppError> {
    let award = state.awards.download_certificate(&id).await?;
    Ok(Json(ApiResponse::new("Award updated successfully", award)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAwardInput>,
) -> Result<Json<ApiResponse<awards::Model>>, AppError> {
    let award = state.awards.update(&id, input).await?;
    Ok(Json(ApiResponse::new("Award updated successfully", award)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<awards::Model>>, AppError> {
    let award = state.awards.remove(&id).await?;
    Ok(Json(ApiResponse::new("Award deleted successfully", award)))
}
