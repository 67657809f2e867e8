use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::entities::seasons::{self, SeasonName};
use crate::services::season_service::{CreateSeasonInput, SeasonDetail, UpdateSeasonInput};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSeasonInput>,
) -> Result<(StatusCode, Json<ApiResponse<seasons::Model>>), AppError> {
    let season = state.seasons.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Season created successfully", season)),
    ))
}

pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<seasons::Model>>>, AppError> {
    let seasons = state.seasons.find_all().await?;
    Ok(Json(ApiResponse::list(
        "Seasons retrieved successfully",
        seasons,
    )))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(name): Path<SeasonName>,
) -> Result<Json<ApiResponse<SeasonDetail>>, AppError> {
    let season = state.seasons.find_one(name).await?;
    Ok(Json(ApiResponse::new(
        "Season retrieved successfully",
        season,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<SeasonName>,
    Json(input): Json<UpdateSeasonInput>,
) -> Result<Json<ApiResponse<seasons::Model>>, AppError> {
    let season = state.seasons.update(name, input).await?;
    Ok(Json(ApiResponse::new(
        "Season updated successfully",
        season,
    )))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<SeasonName>,
) -> Result<Json<ApiResponse<seasons::Model>>, AppError> {
    let season = state.seasons.remove(name).await?;
    Ok(Json(ApiResponse::new(
        "Season deleted successfully",
        season,
    )))
}
