use crate::AppState;
use crate::api::error::AppError;
use crate::entities::prelude::Users;
use crate::entities::users::Role;
use crate::utils::auth::{Claims, validate_jwt};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use sea_orm::EntityTrait;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let Some(token) = token else {
        return Err(AppError::Unauthorized(
            "Authentication token is missing, please login to continue.".to_string(),
        ));
    };

    let claims = validate_jwt(&token, &state.config.jwt_secret).map_err(|e| {
        let message = if *e.kind() == ErrorKind::ExpiredSignature {
            "Session has expired, please login again to continue."
        } else {
            "Invalid auth token, please login again to continue."
        };
        AppError::Unauthorized(message.to_string())
    })?;

    // The account may have been deleted after the token was issued
    let user_exists = Users::find_by_id(claims.sub.clone())
        .one(&state.db)
        .await?
        .is_some();
    if !user_exists {
        return Err(AppError::Unauthorized(
            "Invalid auth token, please login again to continue.".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Role gate layered per route behind `auth_middleware`. SUPER_ADMIN
/// satisfies every requirement.
pub async fn require_role(required: Role, req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req.extensions().get::<Claims>().cloned().ok_or_else(|| {
        AppError::Unauthorized(
            "Authentication token is missing, please login to continue.".to_string(),
        )
    })?;

    if claims.role != required && claims.role != Role::SuperAdmin {
        return Err(AppError::Forbidden(format!(
            "Access denied, you must be {required} to perform this action"
        )));
    }

    Ok(next.run(req).await)
}
