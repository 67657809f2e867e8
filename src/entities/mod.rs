pub mod prelude;

pub mod activities;
pub mod awards;
pub mod performances;
pub mod profiles;
pub mod seasons;
pub mod users;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Hosted image URLs stored as a JSON array column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageUrls(pub Vec<String>);
