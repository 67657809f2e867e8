use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::entities::profiles;
use crate::services::profile_service::{CreateProfileInput, ProfileWithUser, UpdateProfileInput};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateProfileInput>,
) -> Result<(StatusCode, Json<ApiResponse<profiles::Model>>), AppError> {
    let profile = state.profiles.create(&id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Profile created successfully!", profile)),
    ))
}

pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<profiles::Model>>>, AppError> {
    let profiles = state.profiles.find_all().await?;
    Ok(Json(ApiResponse::list(
        "User profiles retrieved successfully",
        profiles,
    )))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProfileWithUser>>, AppError> {
    let profile = state.profiles.find_one(&id, false).await?;
    Ok(Json(ApiResponse::new(
        "User info retrieved successfully",
        profile,
    )))
}

pub async fn find_one_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileWithUser>>, AppError> {
    let profile = state.profiles.find_one(&user_id, true).await?;
    Ok(Json(ApiResponse::new(
        "User info retrieved successfully",
        profile,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<ApiResponse<profiles::Model>>, AppError> {
    let profile = state.profiles.update(&id, input).await?;
    Ok(Json(ApiResponse::new(
        "Profile updated succesfully",
        profile,
    )))
}
