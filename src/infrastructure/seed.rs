use crate::entities::seasons::SeasonName;
use crate::entities::users::{Role, Status};
use crate::entities::{prelude::*, profiles, seasons, users};
use crate::utils::auth::hash_password;
use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

/// Makes sure the platform always has a super admin and a season to
/// attach awards to.
pub async fn seed_initial_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    let email = std::env::var("SUPER_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@student-awards.local".to_string());

    let existing = Users::find()
        .filter(users::Column::Email.eq(&email))
        .one(db)
        .await?;

    if existing.is_none() {
        let password =
            std::env::var("SUPER_ADMIN_PASSWORD").unwrap_or_else(|_| "ChangeMe@123".to_string());
        let now = Utc::now();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email.clone()),
            first_name: Set("Super".to_string()),
            last_name: Set(Some("Admin".to_string())),
            password_hash: Set(Some(hash_password(&password)?)),
            role: Set(Role::SuperAdmin),
            status: Set(Status::Active),
            verified: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        profiles::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user.id),
            username: Set("superadmin".to_string()),
            bio: Set("Platform administrator".to_string()),
            profile_pic: Set(None),
            phone_number: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("🌱 Seeded super admin account: {}", email);
    }

    let season = Seasons::find()
        .filter(seasons::Column::Name.eq(SeasonName::Season3))
        .one(db)
        .await?;

    if season.is_none() {
        let now = Utc::now();
        seasons::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(SeasonName::Season3),
            date: Set(Utc
                .with_ymd_and_hms(2023, 5, 5, 0, 0, 0)
                .single()
                .expect("valid seed date")),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!("🌱 Seeded initial season: {}", SeasonName::Season3);
    }

    Ok(())
}
