use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    CategoryStructure, ColorMode, EngineError, ResultEngine, UserSettings, settings,
};

use super::{Engine, with_tx};

fn snapshot(model: settings::Model, categories: CategoryStructure) -> UserSettings {
    UserSettings {
        user_id: model.id,
        color_mode: model.dark_mode.into(),
        categories,
        version: model.version,
        updated_at: model.updated_at,
        last_sync: model.last_sync,
    }
}

pub(super) fn ensure_version(current: &UserSettings, expected: Option<i64>) -> ResultEngine<()> {
    match expected {
        Some(expected) if expected != current.version => Err(EngineError::Conflict(format!(
            "settings changed (version {expected}, now {})",
            current.version
        ))),
        _ => Ok(()),
    }
}

impl Engine {
    /// Current settings of a user.
    ///
    /// The first read of a user without a document (or with an empty
    /// `categories` field) stores the default categories.
    ///
    /// Always reads the stored row, so writes made by other processes are
    /// seen. While the row is unchanged the previously returned snapshot is
    /// handed out again.
    pub async fn settings(&self, user_id: &str) -> ResultEngine<Arc<UserSettings>> {
        let settings = with_tx!(self, |db_tx| self.load_settings(&db_tx, user_id).await)?;
        if let Some(cached) = self
            .cached_settings(user_id)
            .filter(|cached| **cached == settings)
        {
            return Ok(cached);
        }
        Ok(self.publish_settings(settings))
    }

    /// Store the color mode preference.
    pub async fn set_color_mode(
        &self,
        user_id: &str,
        mode: ColorMode,
    ) -> ResultEngine<Arc<UserSettings>> {
        let settings = with_tx!(self, |db_tx| {
            let current = self.load_settings(&db_tx, user_id).await?;
            Self::write_settings(&db_tx, &current, mode, current.categories.clone()).await
        })?;
        Ok(self.publish_settings(settings))
    }

    /// Replace the whole category document.
    pub async fn replace_categories(
        &self,
        user_id: &str,
        categories: CategoryStructure,
        expected_version: Option<i64>,
    ) -> ResultEngine<Arc<UserSettings>> {
        self.update_categories(user_id, expected_version, |_| Ok(categories))
            .await
    }

    /// Stamp the time of the last successful bank sync.
    pub async fn record_sync(&self, user_id: &str) -> ResultEngine<Arc<UserSettings>> {
        let settings = with_tx!(self, |db_tx| {
            let current = self.load_settings(&db_tx, user_id).await?;
            Self::stamp_sync(&db_tx, current).await
        })?;
        Ok(self.publish_settings(settings))
    }

    /// Read the latest document, apply `transform` to its categories and
    /// write it back.
    ///
    /// Fails with `Conflict` when `expected_version` is stale or when the row
    /// changed between the read and the write.
    pub(super) async fn update_categories<F>(
        &self,
        user_id: &str,
        expected_version: Option<i64>,
        transform: F,
    ) -> ResultEngine<Arc<UserSettings>>
    where
        F: FnOnce(&CategoryStructure) -> ResultEngine<CategoryStructure>,
    {
        let settings = with_tx!(self, |db_tx| {
            let current = self.load_settings(&db_tx, user_id).await?;
            match ensure_version(&current, expected_version)
                .and_then(|()| transform(&current.categories))
            {
                Ok(categories) => {
                    Self::write_settings(&db_tx, &current, current.color_mode, categories).await
                }
                Err(err) => Err(err),
            }
        });
        match settings {
            Ok(settings) => Ok(self.publish_settings(settings)),
            Err(err) => {
                if matches!(err, EngineError::Conflict(_)) {
                    self.forget_settings(user_id);
                }
                Err(err)
            }
        }
    }

    pub(super) async fn load_settings(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<UserSettings> {
        let Some(model) = settings::Entity::find_by_id(user_id.to_string())
            .one(db_tx)
            .await?
        else {
            return Self::create_settings(db_tx, user_id).await;
        };

        match CategoryStructure::from_stored(model.categories.clone()) {
            Some(categories) => Ok(snapshot(model, categories)),
            None => {
                tracing::info!("seeding default categories for {user_id}");
                let current = snapshot(model, CategoryStructure::default());
                let mode = current.color_mode;
                Self::write_settings(db_tx, &current, mode, CategoryStructure::default_seed())
                    .await
            }
        }
    }

    async fn create_settings(
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<UserSettings> {
        tracing::info!("creating settings with default categories for {user_id}");
        let categories = CategoryStructure::default_seed();
        let model = settings::ActiveModel {
            id: ActiveValue::Set(user_id.to_string()),
            dark_mode: ActiveValue::Set(None),
            categories: ActiveValue::Set(Some(serde_json::to_value(&categories)?)),
            version: ActiveValue::Set(1),
            updated_at: ActiveValue::Set(Utc::now()),
            last_sync: ActiveValue::Set(None),
        }
        .insert(db_tx)
        .await?;
        Ok(snapshot(model, categories))
    }

    async fn stamp_sync(
        db_tx: &DatabaseTransaction,
        current: UserSettings,
    ) -> ResultEngine<UserSettings> {
        let now = Utc::now();
        let result = settings::Entity::update_many()
            .col_expr(settings::Column::LastSync, Expr::value(Some(now)))
            .col_expr(settings::Column::UpdatedAt, Expr::value(now))
            .filter(settings::Column::Id.eq(current.user_id.as_str()))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(current.user_id));
        }
        Ok(UserSettings {
            last_sync: Some(now),
            updated_at: now,
            ..current
        })
    }

    /// Versioned write of the whole document.
    async fn write_settings(
        db_tx: &DatabaseTransaction,
        current: &UserSettings,
        mode: ColorMode,
        categories: CategoryStructure,
    ) -> ResultEngine<UserSettings> {
        let now = Utc::now();
        let version = current.version + 1;
        let result = settings::Entity::update_many()
            .col_expr(settings::Column::DarkMode, Expr::value(mode.dark_mode()))
            .col_expr(
                settings::Column::Categories,
                Expr::value(serde_json::to_value(&categories)?),
            )
            .col_expr(settings::Column::Version, Expr::value(version))
            .col_expr(settings::Column::UpdatedAt, Expr::value(now))
            .filter(settings::Column::Id.eq(current.user_id.as_str()))
            .filter(settings::Column::Version.eq(current.version))
            .exec(db_tx)
            .await?;

        if result.rows_affected == 0 {
            tracing::warn!(
                "settings of {} changed concurrently (version {})",
                current.user_id,
                current.version
            );
            return Err(EngineError::Conflict(format!(
                "settings changed concurrently (version {})",
                current.version
            )));
        }

        Ok(UserSettings {
            user_id: current.user_id.clone(),
            color_mode: mode,
            categories,
            version,
            updated_at: now,
            last_sync: current.last_sync,
        })
    }
}
