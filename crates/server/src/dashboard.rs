//! Dashboard API endpoint

use api_types::dashboard::{BucketView, CategoryCountView, Dashboard};
use axum::{Extension, Json, extract::State};
use engine::{bucket_shares, users};

use crate::{ServerError, server::ServerState};

/// Net worth, per-category counts and the category breakdown of the visible
/// accounts.
pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Dashboard>, ServerError> {
    let summary = state.engine.dashboard(&user.username).await?;
    let settings = state.engine.settings(&user.username).await?;

    let shares = bucket_shares(&summary.breakdown);
    let breakdown = summary
        .breakdown
        .into_iter()
        .zip(shares)
        .map(|(bucket, share)| BucketView {
            label: bucket.label,
            total_minor: bucket.total.cents(),
            color: bucket.color.to_string(),
            share,
        })
        .collect();

    let category_counts = summary
        .category_counts
        .into_iter()
        .map(|count| CategoryCountView {
            name: count.name,
            color: count.color.to_string(),
            accounts: count.accounts,
        })
        .collect();

    Ok(Json(Dashboard {
        net_worth_minor: summary.net_worth.cents(),
        total_assets_minor: summary.total_assets.cents(),
        total_liabilities_minor: summary.total_liabilities.cents(),
        asset_accounts: summary.asset_accounts,
        liability_accounts: summary.liability_accounts,
        latest_balance_date: summary.latest_balance_date,
        category_counts,
        uncategorized_accounts: summary.uncategorized_accounts,
        breakdown,
        last_sync: settings.last_sync,
    }))
}
