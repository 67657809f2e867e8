use crate::api::error::AppError;
use crate::entities::awards::AwardCategory;
use crate::entities::seasons::SeasonName;
use crate::entities::{awards, prelude::*, profiles, seasons};
use crate::services::image_lifecycle::ImageLifecycle;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Certificate-download allowance every new award starts with. It only
/// ever decrements.
pub const CERTIFICATE_DOWNLOAD_LIMIT: i32 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAwardInput {
    pub title: String,
    pub caption: String,
    pub category: AwardCategory,
    pub user_profile_id: String,
    pub season_name: SeasonName,
    pub image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAwardInput {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub category: Option<AwardCategory>,
    pub season_name: Option<SeasonName>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardDetail {
    #[serde(flatten)]
    pub award: awards::Model,
    pub season: Option<seasons::Model>,
    pub user_profile: Option<profiles::Model>,
}

pub struct AwardService {
    db: DatabaseConnection,
    images: ImageLifecycle,
}

impl AwardService {
    pub fn new(db: DatabaseConnection, images: ImageLifecycle) -> Self {
        Self { db, images }
    }

    /// Uploads the featured photo, then creates the award in the same
    /// transaction that checks both referenced parents exist.
    pub async fn create(&self, input: CreateAwardInput) -> Result<awards::Model, AppError> {
        if input.image.trim().is_empty() {
            return Err(AppError::Validation("image required".to_string()));
        }

        let CreateAwardInput {
            title,
            caption,
            category,
            user_profile_id,
            season_name,
            image,
        } = input;
        let sources = vec![image];
        let db = &self.db;

        self.images
            .upload_then_persist(&sources, |urls| async move {
                let txn = db.begin().await?;

                let parent_missing = || {
                    AppError::NotFound(
                        "Sorry, season or user profile Id you're trying to add does not exist in our system. please try again or contact an admin for help."
                            .to_string(),
                    )
                };

                Profiles::find_by_id(user_profile_id.as_str())
                    .one(&txn)
                    .await?
                    .ok_or_else(parent_missing)?;
                Seasons::find()
                    .filter(seasons::Column::Name.eq(season_name))
                    .one(&txn)
                    .await?
                    .ok_or_else(parent_missing)?;

                let now = Utc::now();
                let award = awards::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_profile_id: Set(user_profile_id),
                    season_name: Set(season_name),
                    title: Set(title),
                    caption: Set(caption),
                    category: Set(category),
                    featured_photo: Set(urls.into_iter().next()),
                    certificate_downloads: Set(CERTIFICATE_DOWNLOAD_LIMIT),
                    certificate_last_downloaded_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;
                Ok(award)
            })
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<awards::Model>, AppError> {
        Ok(Awards::find().all(&self.db).await?)
    }

    pub async fn find_one(&self, id: &str) -> Result<AwardDetail, AppError> {
        let award = self.find_by_id(id, "Award not found.").await?;

        let season = award.find_related(Seasons).one(&self.db).await?;
        let user_profile = award.find_related(Profiles).one(&self.db).await?;

        Ok(AwardDetail {
            award,
            season,
            user_profile,
        })
    }

    pub async fn find_by_profile(&self, profile_id: &str) -> Result<Vec<awards::Model>, AppError> {
        Ok(Awards::find()
            .filter(awards::Column::UserProfileId.eq(profile_id))
            .all(&self.db)
            .await?)
    }

    /// Updates award fields, optionally replacing the featured photo. The
    /// previous photo is queued for cleanup only after the swap persisted.
    pub async fn update(&self, id: &str, input: UpdateAwardInput) -> Result<awards::Model, AppError> {
        let award = self
            .find_by_id(id, "Award trying to edit does not exist.")
            .await?;

        let new_photo = self
            .images
            .replace_single_image(input.image.as_deref())
            .await?;
        let old_photo = award.featured_photo.clone();

        let mut active: awards::ActiveModel = award.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(caption) = input.caption {
            active.caption = Set(caption);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(season_name) = input.season_name {
            active.season_name = Set(season_name);
        }
        if let Some(url) = new_photo.clone() {
            active.featured_photo = Set(Some(url));
        }
        active.updated_at = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(updated) => {
                if new_photo.is_some()
                    && let Some(old) = old_photo
                    && new_photo.as_deref() != Some(old.as_str())
                {
                    self.images.discard(old);
                }
                Ok(updated)
            }
            Err(e) => {
                if let Some(url) = new_photo {
                    self.images.discard(url);
                }
                Err(AppError::Database(e))
            }
        }
    }

    /// Each successful download burns one unit of the allowance and
    /// stamps the time; the allowance is never replenished.
    pub async fn download_certificate(&self, id: &str) -> Result<awards::Model, AppError> {
        let award = self.find_by_id(id, "Certificate not found!").await?;

        if award.certificate_downloads == 0 {
            return Err(AppError::Forbidden(format!(
                "This certificate has been downloaded {CERTIFICATE_DOWNLOAD_LIMIT} times, please contact an admin for help."
            )));
        }

        let remaining = award.certificate_downloads - 1;
        let mut active: awards::ActiveModel = award.into();
        active.certificate_downloads = Set(remaining);
        active.certificate_last_downloaded_at = Set(Some(Utc::now()));
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn remove(&self, id: &str) -> Result<awards::Model, AppError> {
        let award = self.find_by_id(id, "Award not found.").await?;

        award.clone().delete(&self.db).await?;
        if let Some(photo) = award.featured_photo.clone() {
            self.images.discard(photo);
        }

        Ok(award)
    }

    async fn find_by_id(&self, id: &str, missing: &str) -> Result<awards::Model, AppError> {
        Awards::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }
}
