//! The module contains the errors the engine can throw.
//!
//! Category tree validation failures live in [`CategoryError`]. They are
//! recoverable and meant to be shown to the user as-is; the mutation that
//! produced them is never applied.
//!
//! Everything else is an [`EngineError`], which also wraps [`CategoryError`]
//! so service methods can use a single result type.
use sea_orm::DbErr;
use thiserror::Error;

/// Validation failures of the category tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    #[error("category name must not be empty")]
    EmptyName,
    #[error("category name exceeds {max} characters")]
    NameTooLong { max: usize },
    #[error("category limit of {max} reached")]
    CapExceeded { max: usize },
    #[error("category \"{0}\" already exists")]
    DuplicateName(String),
    #[error("category \"{0}\" has subcategories and cannot be moved under a parent")]
    HasChildrenCannotReparent(String),
    #[error("parent category \"{0}\" not found")]
    ParentNotFound(String),
    #[error("no category at index {0}")]
    IndexOutOfRange(usize),
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Category(a), Self::Category(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
