pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::api::middleware::auth::{auth_middleware, require_role};
use crate::config::AppConfig;
use crate::entities::users::Role;
use crate::services::activity_service::ActivityService;
use crate::services::award_service::AwardService;
use crate::services::image_lifecycle::ImageLifecycle;
use crate::services::performance_service::PerformanceService;
use crate::services::profile_service::ProfileService;
use crate::services::season_service::SeasonService;
use crate::services::user_service::UserService;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub users: Arc<UserService>,
    pub profiles: Arc<ProfileService>,
    pub seasons: Arc<SeasonService>,
    pub performances: Arc<PerformanceService>,
    pub awards: Arc<AwardService>,
    pub activities: Arc<ActivityService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, images: ImageLifecycle, config: AppConfig) -> Self {
        Self {
            users: Arc::new(UserService::new(
                db.clone(),
                images.clone(),
                config.clone(),
            )),
            profiles: Arc::new(ProfileService::new(db.clone(), images.clone())),
            seasons: Arc::new(SeasonService::new(db.clone())),
            performances: Arc::new(PerformanceService::new(db.clone(), images.clone())),
            awards: Arc::new(AwardService::new(db.clone(), images.clone())),
            activities: Arc::new(ActivityService::new(db.clone(), images)),
            db,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    use api::handlers::{activities, awards, health, performances, profiles, seasons, users};

    let public = Router::new()
        .route("/users/login", post(users::login))
        .route("/profile/:id", get(profiles::find_one))
        .route("/profile/user/:user_id", get(profiles::find_one_by_user))
        .route("/seasons", get(seasons::find_all))
        .route("/seasons/:name", get(seasons::find_one))
        .route("/awards", get(awards::find_all))
        .route("/awards/:id", get(awards::find_one))
        .route("/awards/profile/:id", get(awards::find_by_profile))
        .route("/awards/certificate/:id", get(awards::download_certificate))
        .route("/performances", get(performances::find_all))
        .route("/performances/:id", get(performances::find_one))
        .route(
            "/performances/profile/:id",
            get(performances::find_by_profile),
        )
        .route("/activities", get(activities::find_all))
        .route("/activities/:id", get(activities::find_one))
        .route("/activities/profile/:id", get(activities::find_by_profile));

    let admin = Router::new()
        .route("/users", post(users::create).get(users::find_all))
        .route(
            "/users/:id",
            get(users::find_one)
                .patch(users::update)
                .delete(users::remove),
        )
        .route("/profile", get(profiles::find_all))
        .route(
            "/profile/:id",
            post(profiles::create).patch(profiles::update),
        )
        .route("/awards", post(awards::create))
        .route("/awards/:id", patch(awards::update))
        .route("/performances", post(performances::create))
        .route(
            "/performances/:id",
            patch(performances::update).delete(performances::remove),
        )
        .route("/performances/addImage/:id", patch(performances::add_image))
        .route(
            "/performances/removeImage/:id",
            patch(performances::remove_image),
        )
        .route("/activities", post(activities::create))
        .route(
            "/activities/:id",
            patch(activities::update).delete(activities::remove),
        )
        .route("/activities/addImage/:id", patch(activities::add_image))
        .route(
            "/activities/removeImage/:id",
            patch(activities::remove_image),
        )
        .route_layer(from_fn(|req, next| require_role(Role::Admin, req, next)))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let super_admin = Router::new()
        .route("/seasons", post(seasons::create))
        .route(
            "/seasons/:name",
            patch(seasons::update).delete(seasons::remove),
        )
        .route("/awards/:id", delete(awards::remove))
        .route_layer(from_fn(|req, next| {
            require_role(Role::SuperAdmin, req, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", public.merge(admin).merge(super_admin))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
