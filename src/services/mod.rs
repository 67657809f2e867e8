pub mod activity_service;
pub mod award_service;
pub mod cleanup;
pub mod image_lifecycle;
pub mod image_store;
pub mod performance_service;
pub mod profile_service;
pub mod season_service;
pub mod user_service;
