use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::entities::users;
use crate::services::user_service::{
    CreateUserInput, LoginInput, UpdateUserInput, UserDetail, UserWithProfile,
};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub data: UserWithProfile,
    pub token: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<ApiResponse<users::Model>>), AppError> {
    let user = state.users.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User created successfully!", user)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>, AppError> {
    let authenticated = state.users.login(input).await?;
    Ok(Json(LoginResponse {
        message: "User logged in successfully!".to_string(),
        data: authenticated.user,
        token: authenticated.token,
    }))
}

pub async fn find_all(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<UserWithProfile>>>, AppError> {
    let users = state.users.find_all(&claims).await?;
    Ok(Json(ApiResponse::list(
        "Users retrieved successfully",
        users,
    )))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDetail>>, AppError> {
    let user = state.users.find_one(&id).await?;
    Ok(Json(ApiResponse::new(
        "User info retrieved successfully",
        user,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<ApiResponse<users::Model>>, AppError> {
    let user = state.users.update(&id, input).await?;
    Ok(Json(ApiResponse::new(
        "User account updated successfully",
        user,
    )))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserWithProfile>>, AppError> {
    let user = state.users.remove(&id).await?;
    Ok(Json(ApiResponse::new("User deleted successfully!", user)))
}
