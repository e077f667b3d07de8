use std::sync::Arc;

use crate::{
    Category, CategoryEdit, CategoryKind, ColorToken, ResultEngine, UserSettings,
};

use super::Engine;

impl Engine {
    /// Top-level categories (with their subcategories) of one forest.
    pub async fn categories(
        &self,
        user_id: &str,
        kind: CategoryKind,
    ) -> ResultEngine<Vec<Category>> {
        let settings = self.settings(user_id).await?;
        Ok(settings.categories.list(kind).to_vec())
    }

    /// Add a category at the top level or under `parent`.
    pub async fn add_category(
        &self,
        user_id: &str,
        kind: CategoryKind,
        parent: Option<&str>,
        name: &str,
        color: ColorToken,
        expected_version: Option<i64>,
    ) -> ResultEngine<Arc<UserSettings>> {
        self.update_categories(user_id, expected_version, |current| {
            Ok(current.add(kind, parent, name, color)?)
        })
        .await
    }

    /// Edit (and possibly move) the category at `index` in the scope of `parent`.
    pub async fn edit_category(
        &self,
        user_id: &str,
        kind: CategoryKind,
        index: usize,
        parent: Option<&str>,
        edit: CategoryEdit,
        expected_version: Option<i64>,
    ) -> ResultEngine<Arc<UserSettings>> {
        self.update_categories(user_id, expected_version, |current| {
            Ok(current.edit(kind, index, parent, edit)?)
        })
        .await
    }

    /// Delete the category at `index` in the scope of `parent`.
    ///
    /// Accounts still pointing at the removed name keep it.
    pub async fn delete_category(
        &self,
        user_id: &str,
        kind: CategoryKind,
        index: usize,
        parent: Option<&str>,
        expected_version: Option<i64>,
    ) -> ResultEngine<(Arc<UserSettings>, Category)> {
        let mut removed = None;
        let settings = self
            .update_categories(user_id, expected_version, |current| {
                let (next, category) = current.delete(kind, index, parent)?;
                removed = Some(category);
                Ok(next)
            })
            .await?;
        let removed = removed.ok_or_else(|| {
            crate::EngineError::KeyNotFound(format!("{kind} category at index {index}"))
        })?;
        Ok((settings, removed))
    }
}
