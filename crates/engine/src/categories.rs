//! Category types.
//!
//! A user owns one [`CategoryStructure`] made of two independent forests, one
//! for accounts and one for transactions. Each forest is a list of top-level
//! [`Category`] entries, each of which may carry one level of subcategories.
//!
//! Accounts reference categories by **name**, not by id, so a rename or a
//! delete leaves the old name dangling on the account. The resolver in
//! [`crate::color`] is the single place that decides how such names render.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::CategoryError;

/// Maximum length of a category name, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum number of entries in a category list.
pub const MAX_CATEGORIES: usize = 100;
/// Label of the reserved pseudo-category for items without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

const UNCATEGORIZED_COLOR: &str = "red.500";

/// Which forest of a [`CategoryStructure`] an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Account,
    Transaction,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Transaction => "transaction",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "account" | "accounts" => Ok(Self::Account),
            "transaction" | "transactions" => Ok(Self::Transaction),
            other => Err(format!("unknown category kind: {other}")),
        }
    }
}

/// Symbolic color token, e.g. `green.500`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(String);

impl ColorToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Color used for uncategorized items and unresolvable names.
    pub fn uncategorized() -> Self {
        Self(UNCATEGORIZED_COLOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColorToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A named, colored label. Subcategories never have children of their own
/// and always share their parent's color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: ColorToken,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Category>,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<ColorToken>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            subcategories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_subcategories(mut self, subcategories: Vec<Category>) -> Self {
        self.subcategories = subcategories;
        self
    }
}

/// Both category forests of a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStructure {
    pub account_categories: Vec<Category>,
    pub transaction_categories: Vec<Category>,
}

/// Shapes the `categories` column has been stored in over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCategories {
    Structured {
        account_categories: Vec<Category>,
        transaction_categories: Vec<Category>,
    },
    Legacy(Vec<Category>),
    Unknown(serde_json::Value),
}

impl CategoryStructure {
    /// Categories a user starts with.
    pub fn default_seed() -> Self {
        Self {
            account_categories: vec![
                Category::new("Checking", "green.500"),
                Category::new("Savings", "blue.500"),
                Category::new("Investment", "purple.500"),
                Category::new("Credit Card", "red.500"),
            ],
            transaction_categories: vec![
                Category::new("Food", "green.500"),
                Category::new("Bills", "red.500"),
                Category::new("Transportation", "blue.500"),
                Category::new("Entertainment", "purple.500"),
            ],
        }
    }

    /// Decodes the stored document.
    ///
    /// Returns `None` when nothing is stored yet, so the caller can seed the
    /// defaults. A bare list is the legacy single-forest shape and becomes the
    /// account forest. Any other shape decodes to an empty structure.
    pub fn from_stored(value: Option<serde_json::Value>) -> Option<Self> {
        let value = value.filter(|v| !v.is_null())?;
        let decoded = match serde_json::from_value::<StoredCategories>(value) {
            Ok(StoredCategories::Structured {
                account_categories,
                transaction_categories,
            }) => Self {
                account_categories,
                transaction_categories,
            },
            Ok(StoredCategories::Legacy(account_categories)) => Self {
                account_categories,
                transaction_categories: Vec::new(),
            },
            Ok(StoredCategories::Unknown(_)) | Err(_) => Self::default(),
        };
        Some(decoded)
    }

    pub fn list(&self, kind: CategoryKind) -> &[Category] {
        match kind {
            CategoryKind::Account => &self.account_categories,
            CategoryKind::Transaction => &self.transaction_categories,
        }
    }

    pub(crate) fn list_mut(&mut self, kind: CategoryKind) -> &mut Vec<Category> {
        match kind {
            CategoryKind::Account => &mut self.account_categories,
            CategoryKind::Transaction => &mut self.transaction_categories,
        }
    }

    /// Number of categories in a forest, subcategories included.
    pub fn node_count(&self, kind: CategoryKind) -> usize {
        self.list(kind)
            .iter()
            .map(|category| 1 + category.subcategories.len())
            .sum()
    }

    /// Returns `true` if `name` is a top-level category or a subcategory in
    /// the given forest (exact match).
    pub fn contains(&self, kind: CategoryKind, name: &str) -> bool {
        self.list(kind).iter().any(|category| {
            category.name == name || category.subcategories.iter().any(|sub| sub.name == name)
        })
    }
}

/// Trims a category name and checks the length limit.
pub(crate) fn normalize_name(raw: &str) -> Result<String, CategoryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CategoryError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(trimmed.to_string())
}

/// Key used for case-insensitive name comparison.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().nfkc().flat_map(char::to_lowercase).collect()
}
