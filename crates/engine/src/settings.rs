//! Per-user settings document.
//!
//! One row per user holds the color mode preference and the whole
//! [`CategoryStructure`] as JSON. Every write bumps `version`; writers must
//! present the version they read, which turns concurrent edits into a
//! `Conflict` instead of a silent overwrite.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::CategoryStructure;

/// Theme preference. `System` is stored as a null `dark_mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ColorMode {
    pub fn dark_mode(self) -> Option<bool> {
        match self {
            Self::Light => Some(false),
            Self::Dark => Some(true),
            Self::System => None,
        }
    }
}

impl From<Option<bool>> for ColorMode {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Dark,
            Some(false) => Self::Light,
            None => Self::System,
        }
    }
}

/// Immutable snapshot of a user's settings document.
#[derive(Clone, Debug, PartialEq)]
pub struct UserSettings {
    pub user_id: String,
    pub color_mode: ColorMode,
    pub categories: CategoryStructure,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
    pub last_sync: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub dark_mode: Option<bool>,
    pub categories: Option<Json>,
    pub version: i64,
    pub updated_at: DateTimeUtc,
    pub last_sync: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Id",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
