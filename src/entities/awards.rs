use super::seasons::SeasonName;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum AwardCategory {
    #[sea_orm(string_value = "Singer")]
    Singer,
    #[sea_orm(string_value = "Dancer")]
    Dancer,
    #[sea_orm(string_value = "Rapper")]
    Rapper,
    #[sea_orm(string_value = "Actor")]
    Actor,
    #[sea_orm(string_value = "Other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "awards")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_profile_id: String,
    pub season_name: SeasonName,
    pub title: String,
    pub caption: String,
    pub category: AwardCategory,
    pub featured_photo: Option<String>,
    pub certificate_downloads: i32,
    pub certificate_last_downloaded_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::UserProfileId",
        to = "super::profiles::Column::Id"
    )]
    Profiles,
    #[sea_orm(
        belongs_to = "super::seasons::Entity",
        from = "Column::SeasonName",
        to = "super::seasons::Column::Name"
    )]
    Seasons,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seasons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
