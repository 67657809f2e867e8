use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::users::{Role, Status};
use crate::entities::{activities, awards, performances, prelude::*, profiles, users};
use crate::services::image_lifecycle::ImageLifecycle;
use crate::utils::auth::{Claims, create_jwt, hash_password, verify_password};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USER_PAGE_SIZE: u64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub verified: Option<bool>,
}

impl UpdateUserInput {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.verified.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: users::Model,
    pub profile: Option<profiles::Model>,
}

#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: profiles::Model,
    pub performances: Vec<performances::Model>,
    pub activities: Vec<activities::Model>,
    pub awards: Vec<awards::Model>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: users::Model,
    pub profile: Option<ProfileDetail>,
}

#[derive(Debug, Serialize)]
pub struct AuthenticatedUser {
    pub user: UserWithProfile,
    pub token: String,
}

pub struct UserService {
    db: DatabaseConnection,
    images: ImageLifecycle,
    config: AppConfig,
}

impl UserService {
    pub fn new(db: DatabaseConnection, images: ImageLifecycle, config: AppConfig) -> Self {
        Self { db, images, config }
    }

    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, AppError> {
        if input.first_name.trim().is_empty() {
            return Err(AppError::Validation("first name required".to_string()));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(AppError::Validation("please enter email".to_string()));
        }
        if input.password.len() < 5 {
            return Err(AppError::Validation(
                "please enter a strong password".to_string(),
            ));
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| AppError::Internal(e.to_string()))?;
        let now = Utc::now();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            password_hash: Set(Some(password_hash)),
            role: Set(Role::User),
            status: Set(Status::Active),
            verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await.map_err(|e| {
            AppError::conflict_on_unique(
                e,
                "This email is already used, please use a different email.",
            )
        })
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthenticatedUser, AppError> {
        let found = Users::find()
            .filter(users::Column::Email.eq(&input.email))
            .find_also_related(Profiles)
            .one(&self.db)
            .await?;

        let Some((user, profile)) = found else {
            return Err(AppError::NotFound(format!(
                "({}) Account with this email does not exist, please try again.",
                input.email
            )));
        };

        if !user.verified {
            return Err(AppError::Forbidden(format!(
                "({}) This account is not verified, please contact an admin for help.",
                full_name(&user)
            )));
        }
        if user.status != Status::Active {
            return Err(AppError::Forbidden(format!(
                "({}) {} account can not log in, please contact an admin for help.",
                full_name(&user),
                user.status
            )));
        }
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AppError::Forbidden(format!(
                "({}) This account does not have a password set, please check your email to set one.",
                full_name(&user)
            )));
        };
        if !verify_password(&input.password, hash) {
            return Err(AppError::Validation(
                "Incorrect password, please try again.".to_string(),
            ));
        }
        // The dashboard is admin-only so far
        if user.role == Role::User {
            return Err(AppError::Validation(
                "Sorry, you should be an admin to be able to continue.".to_string(),
            ));
        }

        let token = create_jwt(
            &user.id,
            user.role,
            &self.config.jwt_secret,
            self.config.token_ttl_hours,
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(AuthenticatedUser {
            user: UserWithProfile { user, profile },
            token,
        })
    }

    /// Admins only see USER accounts and themselves; super admins see all.
    pub async fn find_all(&self, caller: &Claims) -> Result<Vec<UserWithProfile>, AppError> {
        let mut query = Users::find();
        if caller.role != Role::SuperAdmin {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Role.eq(Role::User))
                    .add(users::Column::Id.eq(caller.sub.clone())),
            );
        }

        let rows = query
            .find_also_related(Profiles)
            .order_by_desc(users::Column::CreatedAt)
            .limit(USER_PAGE_SIZE)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user, profile)| UserWithProfile { user, profile })
            .collect())
    }

    pub async fn find_one(&self, id: &str) -> Result<UserDetail, AppError> {
        let user = Users::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

        let profile = user.find_related(Profiles).one(&self.db).await?;
        let profile = match profile {
            Some(profile) => {
                let performances = profile
                    .find_related(Performances)
                    .order_by_desc(performances::Column::CreatedAt)
                    .all(&self.db)
                    .await?;
                let activities = profile
                    .find_related(Activities)
                    .order_by_desc(activities::Column::CreatedAt)
                    .all(&self.db)
                    .await?;
                let awards = profile
                    .find_related(Awards)
                    .order_by_desc(awards::Column::CreatedAt)
                    .all(&self.db)
                    .await?;
                Some(ProfileDetail {
                    profile,
                    performances,
                    activities,
                    awards,
                })
            }
            None => None,
        };

        Ok(UserDetail { user, profile })
    }

    pub async fn update(&self, id: &str, input: UpdateUserInput) -> Result<users::Model, AppError> {
        if input.is_empty() {
            return Err(AppError::Validation("No changes made".to_string()));
        }

        let user = Users::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

        if user.role == Role::SuperAdmin {
            if input.role.is_some() {
                return Err(AppError::Validation(
                    "Super Admin role can not be changed!".to_string(),
                ));
            }
            if matches!(input.status, Some(status) if status != Status::Active) {
                return Err(AppError::Validation(
                    "Super Admin account can not be inactive!".to_string(),
                ));
            }
            if input.email.is_some() {
                return Err(AppError::Validation(
                    "Super Admin email can not be changed!".to_string(),
                ));
            }
        }

        let email_changed = input.email.is_some();
        let mut active: users::ActiveModel = user.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(password) = input.password {
            let hash = hash_password(&password).map_err(|e| AppError::Internal(e.to_string()))?;
            active.password_hash = Set(Some(hash));
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        // A changed email must be re-verified
        if email_changed {
            active.verified = Set(false);
        } else if let Some(verified) = input.verified {
            active.verified = Set(verified);
        }
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(|e| {
            AppError::conflict_on_unique(
                e,
                "This email is already used, please use a different email.",
            )
        })
    }

    /// Deletes a user and its profile in one transaction, then queues the
    /// profile picture for cleanup. Verified admin accounts are protected.
    pub async fn remove(&self, id: &str) -> Result<UserWithProfile, AppError> {
        let txn = self.db.begin().await?;

        let user = Users::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

        if user.verified && user.role != Role::User {
            return Err(AppError::Forbidden(
                "Verified admin should not be deleted, please unverify this account manually and try again."
                    .to_string(),
            ));
        }

        let profile = user.find_related(Profiles).one(&txn).await?;
        if let Some(profile) = profile.clone() {
            profile.delete(&txn).await?;
        }
        user.clone().delete(&txn).await?;
        txn.commit().await?;

        if let Some(pic) = profile.as_ref().and_then(|p| p.profile_pic.clone()) {
            self.images.discard(pic);
        }

        Ok(UserWithProfile { user, profile })
    }
}

fn full_name(user: &users::Model) -> String {
    match &user.last_name {
        Some(last_name) => format!("{} {}", user.first_name, last_name),
        None => user.first_name.clone(),
    }
}
