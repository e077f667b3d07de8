//! Synced and manual bank accounts.
//!
//! Accounts are written by the bank bridge (or by hand) and read mostly as
//! opaque records. The engine only interprets `balance` and `category`.

use sea_orm::entity::prelude::*;

use crate::aggregate::Categorized;

/// Source tag of accounts pulled by the bank bridge.
pub const SOURCE_BRIDGE: &str = "simplefin-bridge";
/// Source tag of accounts entered by hand.
pub const SOURCE_MANUAL: &str = "manual";

/// An account as stored for a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub sf_account_id: String,
    pub display_name: Option<String>,
    pub sf_account_name: Option<String>,
    pub sf_name: Option<String>,
    /// Decimal string, as delivered by the bridge.
    pub balance: String,
    /// Unix seconds.
    pub sf_balance_date: Option<i64>,
    pub source: String,
    /// Category name (not an id); `None` means uncategorized.
    pub category: Option<String>,
    pub hidden: bool,
}

impl Account {
    /// Name shown to the user: the custom display name if set.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.sf_account_name.as_deref())
            .unwrap_or(&self.sf_account_id)
    }
}

impl Categorized for Account {
    fn balance(&self) -> &str {
        &self.balance
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Incoming account data. Category, display name and hidden flag are user
/// owned and never overwritten by an upsert.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountUpsert {
    /// Missing for manual accounts; one is generated.
    pub sf_account_id: Option<String>,
    pub sf_account_name: Option<String>,
    pub sf_name: Option<String>,
    pub balance: String,
    pub sf_balance_date: Option<i64>,
}

/// User edits to an account. `None` leaves a field as is; an empty string
/// clears `display_name` or `category`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub display_name: Option<String>,
    pub category: Option<String>,
    pub hidden: Option<bool>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.category.is_none() && self.hidden.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub sf_account_id: String,
    pub display_name: Option<String>,
    pub sf_account_name: Option<String>,
    pub sf_name: Option<String>,
    pub balance: String,
    pub sf_balance_date: Option<i64>,
    pub source: String,
    pub category: Option<String>,
    pub hidden: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
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

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            sf_account_id: model.sf_account_id,
            display_name: model.display_name,
            sf_account_name: model.sf_account_name,
            sf_name: model.sf_name,
            balance: model.balance,
            sf_balance_date: model.sf_balance_date,
            source: model.source,
            category: model.category,
            hidden: model.hidden,
        }
    }
}
