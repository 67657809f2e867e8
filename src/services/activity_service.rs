use crate::api::error::AppError;
use crate::entities::{ImageUrls, activities, prelude::*, profiles};
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
pub struct CreateActivityInput {
    pub images: Vec<String>,
    pub title: String,
    pub caption: String,
    pub user_profile_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityInput {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub user_profile_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityImageInput {
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: activities::Model,
    pub user_profile: profiles::Model,
}

pub struct ActivityService {
    db: DatabaseConnection,
    images: ImageLifecycle,
}

impl ActivityService {
    pub fn new(db: DatabaseConnection, images: ImageLifecycle) -> Self {
        Self { db, images }
    }

    /// Uploads all images first, then creates the activity in the same
    /// transaction that checks the owning profile exists. A failed
    /// transaction queues every uploaded image for cleanup.
    pub async fn create(&self, input: CreateActivityInput) -> Result<activities::Model, AppError> {
        validate_image_sources(&input.images)?;

        let CreateActivityInput {
            images,
            title,
            caption,
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
                let activity = activities::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_profile_id: Set(user_profile_id),
                    title: Set(title),
                    caption: Set(caption),
                    images: Set(ImageUrls(urls)),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;
                Ok(activity)
            })
            .await
    }

    pub async fn find_all(
        &self,
        profile_id: Option<&str>,
    ) -> Result<Vec<activities::Model>, AppError> {
        let mut query = Activities::find();
        if let Some(id) = profile_id {
            query = query.filter(activities::Column::UserProfileId.eq(id));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn find_one(&self, id: &str) -> Result<ActivityDetail, AppError> {
        let (activity, profile) = Activities::find_by_id(id)
            .find_also_related(Profiles)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Activity not found in our system".to_string())
            })?;

        let user_profile = profile.ok_or_else(|| {
            AppError::NotFound("The activity trying to retrieve has no profile.".to_string())
        })?;

        Ok(ActivityDetail {
            activity,
            user_profile,
        })
    }

    pub async fn update(
        &self,
        id: &str,
        input: UpdateActivityInput,
    ) -> Result<activities::Model, AppError> {
        let activity = self
            .find_by_id(id, "Activity trying to edit does not exist.")
            .await?;

        let mut active: activities::ActiveModel = activity.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(caption) = input.caption {
            active.caption = Set(caption);
        }
        if let Some(user_profile_id) = input.user_profile_id {
            active.user_profile_id = Set(user_profile_id);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn add_image(&self, id: &str, source: &str) -> Result<activities::Model, AppError> {
        let activity = self
            .find_by_id(id, "Activity trying to edit does not exist.")
            .await?;
        let current = activity.images.0.clone();
        let db = &self.db;

        self.images
            .add_image("Activity", source, &current, |images| async move {
                let mut active: activities::ActiveModel = activity.into();
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
    ) -> Result<activities::Model, AppError> {
        let activity = self.find_by_id(id, "Activity not found!").await?;
        let current = activity.images.0.clone();
        let db = &self.db;

        self.images
            .remove_image("Activity", target, &current, |images| async move {
                let mut active: activities::ActiveModel = activity.into();
                active.images = Set(ImageUrls(images));
                active.updated_at = Set(Utc::now());
                Ok(active.update(db).await?)
            })
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<activities::Model, AppError> {
        let activity = self
            .find_by_id(id, "Activity not found in our system")
            .await?;

        activity.clone().delete(&self.db).await?;
        self.images.discard_entity_images(activity.images.0.clone());

        Ok(activity)
    }

    async fn find_by_id(&self, id: &str, missing: &str) -> Result<activities::Model, AppError> {
        Activities::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }
}
