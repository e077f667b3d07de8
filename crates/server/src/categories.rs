//! Categories API endpoints.
//!
//! `{kind}` selects the forest (`account` or `transaction`). `{index}` is the
//! position of the entry inside the list chosen by the `parent` field of the
//! request body: the top-level list when absent, otherwise the parent's
//! subcategories.

use api_types::category::{
    CategoryDelete, CategoryDeleted, CategoryListResponse, CategoryNew, CategoryStructureView,
    CategoryUpdate, CategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Category, CategoryEdit, CategoryKind, CategoryStructure, ColorToken, users};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_category(category: &Category) -> CategoryView {
    CategoryView {
        name: category.name.clone(),
        color: category.color.to_string(),
        subcategories: category.subcategories.iter().map(map_category).collect(),
    }
}

fn map_list(categories: &[Category]) -> Vec<CategoryView> {
    categories.iter().map(map_category).collect()
}

pub(crate) fn map_structure(structure: &CategoryStructure) -> CategoryStructureView {
    CategoryStructureView {
        account_categories: map_list(&structure.account_categories),
        transaction_categories: map_list(&structure.transaction_categories),
    }
}

fn parse_kind(kind: &str) -> Result<CategoryKind, ServerError> {
    kind.parse().map_err(ServerError::Generic)
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    let settings = state.engine.settings(&user.username).await?;
    Ok(Json(CategoryListResponse {
        categories: map_list(settings.categories.list(kind)),
        version: settings.version,
    }))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryListResponse>), ServerError> {
    let kind = parse_kind(&kind)?;
    let settings = state
        .engine
        .add_category(
            &user.username,
            kind,
            payload.parent.as_deref(),
            &payload.name,
            ColorToken::new(payload.color),
            payload.version,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryListResponse {
            categories: map_list(settings.categories.list(kind)),
            version: settings.version,
        }),
    ))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((kind, index)): Path<(String, usize)>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let kind = parse_kind(&kind)?;
    let edit = CategoryEdit {
        name: payload.name,
        color: ColorToken::new(payload.color),
        parent: payload.new_parent,
    };
    let settings = state
        .engine
        .edit_category(
            &user.username,
            kind,
            index,
            payload.parent.as_deref(),
            edit,
            payload.version,
        )
        .await?;
    Ok(Json(CategoryListResponse {
        categories: map_list(settings.categories.list(kind)),
        version: settings.version,
    }))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((kind, index)): Path<(String, usize)>,
    Json(payload): Json<CategoryDelete>,
) -> Result<Json<CategoryDeleted>, ServerError> {
    let kind = parse_kind(&kind)?;
    let (settings, removed) = state
        .engine
        .delete_category(
            &user.username,
            kind,
            index,
            payload.parent.as_deref(),
            payload.version,
        )
        .await?;
    Ok(Json(CategoryDeleted {
        removed: map_category(&removed),
        categories: map_list(settings.categories.list(kind)),
        version: settings.version,
    }))
}
