use crate::api::error::AppError;
use crate::entities::seasons::SeasonName;
use crate::entities::{awards, performances, prelude::*, seasons};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateSeasonInput {
    pub name: SeasonName,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSeasonInput {
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SeasonDetail {
    #[serde(flatten)]
    pub season: seasons::Model,
    pub performances: Vec<performances::Model>,
    pub awards: Vec<awards::Model>,
}

pub struct SeasonService {
    db: DatabaseConnection,
}

impl SeasonService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateSeasonInput) -> Result<seasons::Model, AppError> {
        let now = Utc::now();
        let season = seasons::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(input.name),
            date: Set(input.date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        season
            .insert(&self.db)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "Event season already exists"))
    }

    pub async fn find_all(&self) -> Result<Vec<seasons::Model>, AppError> {
        Ok(Seasons::find().all(&self.db).await?)
    }

    pub async fn find_one(&self, name: SeasonName) -> Result<SeasonDetail, AppError> {
        let season = self.find_by_name(name).await?;

        let performances = season.find_related(Performances).all(&self.db).await?;
        let awards = season.find_related(Awards).all(&self.db).await?;

        Ok(SeasonDetail {
            season,
            performances,
            awards,
        })
    }

    pub async fn update(
        &self,
        name: SeasonName,
        input: UpdateSeasonInput,
    ) -> Result<seasons::Model, AppError> {
        let Some(date) = input.date else {
            return Err(AppError::Validation("No changes made".to_string()));
        };

        let season = self.find_by_name(name).await?;
        let mut active: seasons::ActiveModel = season.into();
        active.date = Set(date);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn remove(&self, name: SeasonName) -> Result<seasons::Model, AppError> {
        let season = self.find_by_name(name).await?;
        season.clone().delete(&self.db).await?;
        Ok(season)
    }

    async fn find_by_name(&self, name: SeasonName) -> Result<seasons::Model, AppError> {
        Seasons::find()
            .filter(seasons::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{name} not found in our system")))
    }
}
