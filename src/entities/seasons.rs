use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SeasonName {
    #[sea_orm(string_value = "SEASON_1")]
    #[serde(rename = "SEASON_1")]
    Season1,
    #[sea_orm(string_value = "SEASON_2")]
    #[serde(rename = "SEASON_2")]
    Season2,
    #[sea_orm(string_value = "SEASON_3")]
    #[serde(rename = "SEASON_3")]
    Season3,
}

impl std::fmt::Display for SeasonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeasonName::Season1 => "SEASON_1",
            SeasonName::Season2 => "SEASON_2",
            SeasonName::Season3 => "SEASON_3",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seasons")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: SeasonName,
    pub date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::performances::Entity")]
    Performances,
    #[sea_orm(has_many = "super::awards::Entity")]
    Awards,
}

impl Related<super::performances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Performances.def()
    }
}

impl Related<super::awards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Awards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
