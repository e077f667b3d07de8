//! Category tree model and settings/accounts service.
//!
//! The pure part of the crate (category types, validation and mutation,
//! name resolution, aggregation) works on plain values and never touches the
//! database. [`Engine`] wraps it with persistence: it loads a user's settings
//! document, applies a pure transform and writes the whole document back.

pub use accounts::{Account, AccountPatch, AccountUpsert, SOURCE_BRIDGE, SOURCE_MANUAL};
pub use aggregate::{Bucket, Categorized, aggregate_by_category, bucket_shares};
pub use categories::{
    Category, CategoryKind, CategoryStructure, ColorToken, MAX_CATEGORIES, MAX_NAME_LEN,
    UNCATEGORIZED_LABEL,
};
pub use category_tree::CategoryEdit;
pub use color::{resolve_color, top_level_of};
pub use dashboard::{CategoryCount, DashboardSummary, summarize};
pub use error::{CategoryError, EngineError};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use settings::{ColorMode, UserSettings};

mod accounts;
mod aggregate;
mod categories;
mod category_tree;
mod color;
mod dashboard;
mod error;
mod money;
mod ops;
mod settings;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
