use crate::api::error::AppError;
use crate::entities::seasons::SeasonName;
use crate::entities::{ImageUrls, performances, prelude::*, profiles};
use crate::services::image_lifecycle::{ImageLifecycle, validate_image_sources};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformanceInput {
    pub season_name: SeasonName,
    pub images: Vec<String>,
    pub video_url: String,
    pub duration: String,
    pub title: String,
    pub description: String,
    pub user_profile_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerformanceInput {
    pub season_name: Option<SeasonName>,
    pub video_url: Option<String>,
    pub duration: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PerformanceImageInput {
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDetail {
    #[serde(flatten)]
    pub performance: performances::Model,
    pub user_profile: profiles::Model,
}

pub struct PerformanceService {
    db: DatabaseConnection,
    images: ImageLifecycle,
}

impl PerformanceService {
    pub fn new(db: DatabaseConnection, images: ImageLifecycle) -> Self {
        Self { db, images }
    }

    pub async fn create(
        &self,
        input: CreatePerformanceInput,
    ) -> Result<performances::Model, AppError> {
        validate_image_sources(&input.images)?;
        if input.video_url.trim().is_empty() {
            return Err(AppError::Validation("video url required".to_string()));
        }

        let CreatePerformanceInput {
            season_name,
            images,
            video_url,
            duration,
            title,
            description,
            user_profile_id,
        } = input;
        let db = &self.db;

        self.images
            .upload_then_persist(&images, |urls| async move {
                let txn = db.begin().await?;

                Profiles::find_by_id(user_profile_id.as_str())
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("The profile does not exist.".to_string()))?;

                let now = Utc::now();
                let performance = performances::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_profile_id: Set(user_profile_id),
                    season_name: Set(season_name),
                    title: Set(title),
                    description: Set(description),
                    video_url: Set(video_url),
                    duration: Set(duration),
                    images: Set(ImageUrls(urls)),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;
                Ok(performance)
            })
            .await
    }

    pub async fn find_all(
        &self,
        profile_id: Option<&str>,
    ) -> Result<Vec<performances::Model>, AppError> {
        let mut query = Performances::find();
        if let Some(id) = profile_id {
            query = query.filter(performances::Column::UserProfileId.eq(id));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn find_one(&self, id: &str) -> Result<PerformanceDetail, AppError> {
        let (performance, profile) = Performances::find_by_id(id)
            .find_also_related(Profiles)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Performance not found in our system".to_string())
            })?;

        let user_profile = profile.ok_or_else(|| {
            AppError::NotFound("The performance trying to retrieve has no profile.".to_string())
        })?;

        Ok(PerformanceDetail {
            performance,
            user_profile,
        })
    }

    pub async fn update(
        &self,
        id: &str,
        input: UpdatePerformanceInput,
    ) -> Result<performances::Model, AppError> {
        let performance = self
            .find_by_id(id, "Performance trying to edit does not exist.")
            .await?;

        let mut active: performances::ActiveModel = performance.into();
        if let Some(season_name) = input.season_name {
            active.season_name = Set(season_name);
        }
        if let Some(video_url) = input.video_url {
            active.video_url = Set(video_url);
        }
        if let Some(duration) = input.duration {
            active.duration = Set(duration);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn add_image(&self, id: &str, source: &str) -> Result<performances::Model, AppError> {
        let performance = self
            .find_by_id(id, "Performance trying to edit does not exist.")
            .await?;
        let current = performance.images.0.clone();
        let db = &self.db;

        self.images
            .add_image("Performance", source, &current, |images| async move {
                let mut active: performances::ActiveModel = performance.into();
                active.images = Set(ImageUrls(images));
                active.updated_at = Set(Utc::now());
                Ok(active.update(db).await?)
            })
            .await
    }

    pub async fn remove_image(
        &self,
        id: &str,
        target: &str,
    ) -> Result<performances::Model, AppError> {
        let performance = self.find_by_id(id, "Performance not found!").await?;
        let current = performance.images.0.clone();
        let db = &self.db;

        self.images
            .remove_image("Performance", target, &current, |images| async move {
                let mut active: performances::ActiveModel = performance.into();
                active.images = Set(ImageUrls(images));
                active.updated_at = Set(Utc::now());
                Ok(active.update(db).await?)
            })
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<performances::Model, AppError> {
        let performance = self
            .find_by_id(id, "Performance not found in our system")
            .await?;

        performance.clone().delete(&self.db).await?;
        self.images
            .discard_entity_images(performance.images.0.clone());

        Ok(performance)
    }

    async fn find_by_id(&self, id: &str, missing: &str) -> Result<performances::Model, AppError> {
        Performances::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }
}
