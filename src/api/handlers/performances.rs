use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::entities::performances;
use crate::services::performance_service::{
    CreatePerformanceInput, PerformanceDetail, PerformanceImageInput, UpdatePerformanceInput,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePerformanceInput>,
) -> Result<(StatusCode, Json<ApiResponse<performances::Model>>), AppError> {
    let performance = state.performances.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Performance added successfully",
            performance,
        )),
    ))
}

pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<performances::Model>>>, AppError> {
    let performances = state.performances.find_all(None).await?;
    Ok(Json(ApiResponse::list(
        "Performances retrieved successfully",
        performances,
    )))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PerformanceDetail>>, AppError> {
    let performance = state.performances.find_one(&id).await?;
    Ok(Json(ApiResponse::new(
        "Performance retrieved successfully",
        performance,
    )))
}

pub async fn find_by_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<performances::Model>>>, AppError> {
    let performances = state.performances.find_all(Some(&id)).await?;
    Ok(Json(ApiResponse::list(
        "Performances retrieved successfully",
        performances,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePerformanceInput>,
) -> Result<Json<ApiResponse<performances::Model>>, AppError> {
    let performance = state.performances.update(&id, input).await?;
    Ok(Json(ApiResponse::new(
        "Performance updated successfully",
        performance,
    )))
}

pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PerformanceImageInput>,
) -> Result<Json<ApiResponse<performances::Model>>, AppError> {
    let performance = state.performances.add_image(&id, &input.image).await?;
    Ok(Json(ApiResponse::new(
        "Image added successfully to the performance",
        performance,
    )))
}

pub async fn remove_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PerformanceImageInput>,
) -> Result<Json<ApiResponse<performances::Model>>, AppError> {
    let performance = state.performances.remove_image(&id, &input.image).await?;
    Ok(Json(ApiResponse::new(
        "Image removed successfully from the performance.",
        performance,
    )))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<performances::Model>>, AppError> {
    let performance = state.performances.remove(&id).await?;
    Ok(Json(ApiResponse::new(
        "Performance deleted successfully",
        performance,
    )))
}
