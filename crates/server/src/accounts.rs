//! Accounts API endpoints.

use api_types::account::{
    AccountList, AccountListResponse, AccountSource, AccountUpdate, AccountView, AccountsUpsert,
    AccountsUpserted,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    Account, AccountPatch, AccountUpsert, CategoryKind, CategoryStructure, MoneyCents,
    SOURCE_BRIDGE, SOURCE_MANUAL, users,
};

use crate::{ServerError, server::ServerState};

fn map_account(account: Account, categories: &CategoryStructure) -> Result<AccountView, ServerError> {
    let balance_minor = MoneyCents::parse_balance(&account.balance)?.cents();
    let color = categories.resolve_color(CategoryKind::Account, account.category.as_deref());
    Ok(AccountView {
        name: account.label().to_string(),
        id: account.sf_account_id,
        display_name: account.display_name,
        sf_account_name: account.sf_account_name,
        sf_name: account.sf_name,
        balance: account.balance,
        balance_minor,
        balance_date: account.sf_balance_date,
        source: account.source,
        category: account.category,
        color: color.to_string(),
        hidden: account.hidden,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let settings = state.engine.settings(&user.username).await?;
    let accounts = state
        .engine
        .accounts(&user.username, query.show_hidden.unwrap_or(false))
        .await?
        .into_iter()
        .map(|account| map_account(account, &settings.categories))
        .collect::<Result<_, _>>()?;

    Ok(Json(AccountListResponse { accounts }))
}

pub async fn upsert(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountsUpsert>,
) -> Result<(StatusCode, Json<AccountsUpserted>), ServerError> {
    if payload.accounts.is_empty() {
        return Err(ServerError::Generic("no accounts given".to_string()));
    }

    let source = match payload.source {
        AccountSource::Manual => SOURCE_MANUAL,
        AccountSource::Bridge => SOURCE_BRIDGE,
    };
    let incoming = payload
        .accounts
        .into_iter()
        .map(|account| AccountUpsert {
            sf_account_id: account.id,
            sf_account_name: account.name,
            sf_name: account.org,
            balance: account.balance,
            sf_balance_date: account.balance_date,
        })
        .collect();

    let written = state
        .engine
        .upsert_accounts(&user.username, incoming, source)
        .await?;
    Ok((StatusCode::CREATED, Json(AccountsUpserted { written })))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(account_id): Path<String>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let patch = AccountPatch {
        display_name: payload.display_name,
        category: payload.category,
        hidden: payload.hidden,
    };
    if patch.is_empty() {
        return Err(ServerError::Generic("nothing to update".to_string()));
    }

    let account = state
        .engine
        .update_account(&user.username, &account_id, patch)
        .await?;
    let settings = state.engine.settings(&user.username).await?;
    Ok(Json(map_account(account, &settings.categories)?))
}
