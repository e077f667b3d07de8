//! Category name resolution.
//!
//! Account and transaction records carry a category *name*. These helpers are
//! the only place that turns such a name into a color or a top-level owner,
//! so the policy for missing and orphaned names lives here. Callers pick the
//! forest explicitly.

use crate::{Category, CategoryKind, CategoryStructure, ColorToken};

/// Display color of `name` within `categories`.
///
/// Top-level entries are matched first, then subcategories (whose color is
/// always the parent's). `None`, an empty name, or a name absent from the
/// forest resolves to [`ColorToken::uncategorized`].
pub fn resolve_color(name: Option<&str>, categories: &[Category]) -> ColorToken {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return ColorToken::uncategorized();
    };

    if let Some(category) = categories.iter().find(|c| c.name == name) {
        return category.color.clone();
    }

    categories
        .iter()
        .flat_map(|c| c.subcategories.iter())
        .find(|sub| sub.name == name)
        .map(|sub| sub.color.clone())
        .unwrap_or_else(ColorToken::uncategorized)
}

/// Name of the top-level category that owns `name`, if any.
///
/// A top-level name owns itself; a subcategory rolls up to its parent.
pub fn top_level_of<'a>(name: &str, categories: &'a [Category]) -> Option<&'a str> {
    if let Some(category) = categories.iter().find(|c| c.name == name) {
        return Some(category.name.as_str());
    }
    categories
        .iter()
        .find(|c| c.subcategories.iter().any(|sub| sub.name == name))
        .map(|c| c.name.as_str())
}

impl CategoryStructure {
    pub fn resolve_color(&self, kind: CategoryKind, name: Option<&str>) -> ColorToken {
        resolve_color(name, self.list(kind))
    }
}
