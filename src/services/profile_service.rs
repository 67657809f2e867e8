use crate::api::error::AppError;
use crate::entities::{prelude::*, profiles, users};
use crate::services::image_lifecycle::ImageLifecycle;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileInput {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileWithUser {
    #[serde(flatten)]
    pub profile: profiles::Model,
    pub user: Option<users::Model>,
}

pub struct ProfileService {
    db: DatabaseConnection,
    images: ImageLifecycle,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection, images: ImageLifecycle) -> Self {
        Self { db, images }
    }

    /// Creates the profile of an existing user. The user lookup and the
    /// insert share one transaction, so a missing user aborts the insert
    /// and queues the uploaded picture for cleanup.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateProfileInput,
    ) -> Result<profiles::Model, AppError> {
        if input.username.trim().is_empty() {
            return Err(AppError::Validation("username required".to_string()));
        }

        let CreateProfileInput {
            username,
            bio,
            image,
            phone_number,
        } = input;
        let sources: Vec<String> = image.into_iter().collect();
        let db = &self.db;

        self.images
            .upload_then_persist(&sources, |urls| async move {
                let txn = db.begin().await?;

                let user = Users::find_by_id(user_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

                let now = Utc::now();
                let profile = profiles::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_id: Set(user.id),
                    username: Set(username),
                    bio: Set(bio),
                    profile_pic: Set(urls.into_iter().next()),
                    phone_number: Set(phone_number),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await
                .map_err(|e| AppError::conflict_on_unique(e, "Profile already exists"))?;

                txn.commit().await?;
                Ok(profile)
            })
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<profiles::Model>, AppError> {
        Ok(Profiles::find().all(&self.db).await?)
    }

    pub async fn find_one(&self, id: &str, by_user_id: bool) -> Result<ProfileWithUser, AppError> {
        let column = if by_user_id {
            profiles::Column::UserId
        } else {
            profiles::Column::Id
        };

        let found = Profiles::find()
            .filter(column.eq(id))
            .find_also_related(Users)
            .one(&self.db)
            .await?;

        let Some((profile, user)) = found else {
            let message = if by_user_id {
                format!("Profile with this user Id '{id}' isn't found in our system")
            } else {
                "Profile not found!".to_string()
            };
            return Err(AppError::NotFound(message));
        };

        Ok(ProfileWithUser { profile, user })
    }

    /// Updates the profile belonging to `user_id`, optionally replacing
    /// the picture. The old picture is queued for cleanup only once the
    /// replacement is persisted.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> Result<profiles::Model, AppError> {
        let profile = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found!".to_string()))?;

        let new_pic = self
            .images
            .replace_single_image(input.image.as_deref())
            .await?;
        let old_pic = profile.profile_pic.clone();

        let mut active: profiles::ActiveModel = profile.into();
        if let Some(username) = input.username {
            active.username = Set(username);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }
        if let Some(phone_number) = input.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        if let Some(url) = new_pic.clone() {
            active.profile_pic = Set(Some(url));
        }
        active.updated_at = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(updated) => {
                if new_pic.is_some()
                    && let Some(old) = old_pic
                    && new_pic.as_deref() != Some(old.as_str())
                {
                    self.images.discard(old);
                }
                Ok(updated)
            }
            Err(e) => {
                if let Some(url) = new_pic {
                    self.images.discard(url);
                }
                Err(AppError::Database(e))
            }
        }
    }
}
