use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::entities::activities;
use crate::services::activity_service::{
    ActivityDetail, ActivityImageInput, CreateActivityInput, UpdateActivityInput,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateActivityInput>,
) -> Result<(StatusCode, Json<ApiResponse<activities::Model>>), AppError> {
    let activity = state.activities.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Activity added successfully", activity)),
    ))
}

pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<activities::Model>>>, AppError> {
    let activities = state.activities.find_all(None).await?;
    Ok(Json(ApiResponse::list(
        "Activities retrieved successfully",
        activities,
    )))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ActivityDetail>>, AppError> {
    let activity = state.activities.find_one(&id).await?;
    Ok(Json(ApiResponse::new(
        "Activity retrieved successfully",
        activity,
    )))
}

pub async fn find_by_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<activities::Model>>>, AppError> {
    let activities = state.activities.find_all(Some(&id)).await?;
    Ok(Json(ApiResponse::list(
        "Activities retrieved successfully",
        activities,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateActivityInput>,
) -> Result<Json<ApiResponse<activities::Model>>, AppError> {
    let activity = state.activities.update(&id, input).await?;
    Ok(Json(ApiResponse::new(
        "Activity updated successfully",
        activity,
    )))
}

pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActivityImageInput>,
) -> Result<Json<ApiResponse<activities::Model>>, AppError> {
    let activity = state.activities.add_image(&id, &input.image).await?;
    Ok(Json(ApiResponse::new(
        "Image added successfully to the activity",
        activity,
    )))
}

pub async fn remove_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActivityImageInput>,
) -> Result<Json<ApiResponse<activities::Model>>, AppError> {
    let activity = state.activities.remove_image(&id, &input.image).await?;
    Ok(Json(ApiResponse::new(
        "Image removed successfully from the activity.",
        activity,
    )))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<activities::Model>>, AppError> {
    let activity = state.activities.remove(&id).await?;
    Ok(Json(ApiResponse::new(
        "Activity deleted successfully",
        activity,
    )))
}
