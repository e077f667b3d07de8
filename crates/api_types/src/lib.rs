use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub name: String,
        /// Symbolic color token, e.g. `green.500`.
        pub color: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub subcategories: Vec<CategoryView>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryStructureView {
        pub account_categories: Vec<CategoryView>,
        pub transaction_categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
        /// Settings document version to send back with the next change.
        pub version: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// Ignored for subcategories, which take the parent's color.
        pub color: String,
        pub parent: Option<String>,
        pub version: Option<i64>,
    }

    /// Edit of the entry at `{index}` in the scope of `parent`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        /// Scope the index refers to (`None` for top-level).
        pub parent: Option<String>,
        pub name: String,
        pub color: String,
        /// Parent after the edit (`None` for top-level).
        pub new_parent: Option<String>,
        pub version: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryDelete {
        pub parent: Option<String>,
        pub version: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDeleted {
        pub removed: CategoryView,
        pub categories: Vec<CategoryView>,
        pub version: i64,
    }
}

pub mod settings {
    use super::{category::CategoryStructureView, *};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ColorMode {
        Light,
        Dark,
        System,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettingsView {
        pub id: String,
        pub color_mode: ColorMode,
        /// Stored form of `color_mode`; `null` follows the system.
        pub dark_mode: Option<bool>,
        pub categories: CategoryStructureView,
        pub version: i64,
        pub updated_at: DateTime<Utc>,
        pub last_sync: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ColorModeUpdate {
        pub mode: ColorMode,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub show_hidden: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: String,
        /// Display name if set, otherwise the bank's account name.
        pub name: String,
        pub display_name: Option<String>,
        pub sf_account_name: Option<String>,
        pub sf_name: Option<String>,
        pub balance: String,
        pub balance_minor: i64,
        /// Unix seconds.
        pub balance_date: Option<i64>,
        pub source: String,
        pub category: Option<String>,
        pub color: String,
        pub hidden: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        /// Omit for manual accounts; the server generates one.
        pub id: Option<String>,
        pub name: Option<String>,
        pub org: Option<String>,
        pub balance: String,
        pub balance_date: Option<i64>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountSource {
        #[default]
        Manual,
        Bridge,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsUpsert {
        #[serde(default)]
        pub source: AccountSource,
        pub accounts: Vec<AccountNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsUpserted {
        pub written: usize,
    }

    /// Omitted fields are left as they are; an empty string clears
    /// `display_name` or `category`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub display_name: Option<String>,
        pub category: Option<String>,
        pub hidden: Option<bool>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BucketView {
        pub label: String,
        pub total_minor: i64,
        pub color: String,
        /// Percent of the breakdown total.
        pub share: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCountView {
        pub name: String,
        pub color: String,
        pub accounts: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        pub net_worth_minor: i64,
        pub total_assets_minor: i64,
        pub total_liabilities_minor: i64,
        pub asset_accounts: usize,
        pub liability_accounts: usize,
        pub latest_balance_date: Option<i64>,
        pub category_counts: Vec<CategoryCountView>,
        pub uncategorized_accounts: usize,
        pub breakdown: Vec<BucketView>,
        pub last_sync: Option<DateTime<Utc>>,
    }
}

pub mod sync {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    pub enum SyncResponse {
        Synced { accounts: usize },
        /// The bridge refused to sync yet; nothing was re-read.
        Cooldown { message: String },
    }
}
