use sea_orm::{
    ActiveValue, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait, TryIntoModel,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, AccountPatch, AccountUpsert, CategoryKind, DashboardSummary, EngineError,
    MoneyCents, ResultEngine, accounts, dashboard::summarize,
};

use super::{Engine, with_tx};

impl Engine {
    /// Accounts of a user ordered by id. Hidden ones only on request.
    pub async fn accounts(&self, user_id: &str, include_hidden: bool) -> ResultEngine<Vec<Account>> {
        let mut query = accounts::Entity::find().filter(accounts::Column::UserId.eq(user_id));
        if !include_hidden {
            query = query.filter(accounts::Column::Hidden.eq(false));
        }
        let models = query
            .order_by_asc(accounts::Column::SfAccountId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    /// Insert new accounts and refresh the bank fields of known ones.
    ///
    /// The whole batch is rejected if any balance is malformed. Returns the
    /// number of accounts written.
    pub async fn upsert_accounts(
        &self,
        user_id: &str,
        incoming: Vec<AccountUpsert>,
        source: &str,
    ) -> ResultEngine<usize> {
        for account in &incoming {
            MoneyCents::parse_balance(&account.balance)?;
        }

        with_tx!(self, |db_tx| {
            let mut written = 0;
            for account in incoming {
                let id = account
                    .sf_account_id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| format!("manual-{}", Uuid::new_v4()));

                let existing = accounts::Entity::find_by_id((user_id.to_string(), id.clone()))
                    .one(&db_tx)
                    .await?;

                match existing {
                    Some(model) => {
                        let mut model = model.into_active_model();
                        model.sf_account_name = ActiveValue::Set(account.sf_account_name);
                        model.sf_name = ActiveValue::Set(account.sf_name);
                        model.balance = ActiveValue::Set(account.balance);
                        model.sf_balance_date = ActiveValue::Set(account.sf_balance_date);
                        model.source = ActiveValue::Set(source.to_string());
                        if model.is_changed() {
                            model.update(&db_tx).await?;
                        }
                    }
                    None => {
                        accounts::ActiveModel {
                            user_id: ActiveValue::Set(user_id.to_string()),
                            sf_account_id: ActiveValue::Set(id),
                            display_name: ActiveValue::Set(None),
                            sf_account_name: ActiveValue::Set(account.sf_account_name),
                            sf_name: ActiveValue::Set(account.sf_name),
                            balance: ActiveValue::Set(account.balance),
                            sf_balance_date: ActiveValue::Set(account.sf_balance_date),
                            source: ActiveValue::Set(source.to_string()),
                            category: ActiveValue::Set(None),
                            hidden: ActiveValue::Set(false),
                        }
                        .insert(&db_tx)
                        .await?;
                    }
                }
                written += 1;
            }
            tracing::debug!("upserted {written} {source} accounts for {user_id}");
            Ok(written)
        })
    }

    /// Apply user edits to one account.
    ///
    /// A category must name an account category or subcategory that exists
    /// now; an empty string clears it.
    pub async fn update_account(
        &self,
        user_id: &str,
        account_id: &str,
        patch: AccountPatch,
    ) -> ResultEngine<Account> {
        let category = match patch.category {
            Some(name) if name.trim().is_empty() => Some(None),
            Some(name) => {
                let name = name.trim().to_string();
                let settings = self.settings(user_id).await?;
                if !settings.categories.contains(CategoryKind::Account, &name) {
                    return Err(EngineError::KeyNotFound(name));
                }
                Some(Some(name))
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            let model = accounts::Entity::find_by_id((user_id.to_string(), account_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(account_id.to_string()))?;

            let mut model = model.into_active_model();
            if let Some(display_name) = patch.display_name {
                let display_name = display_name.trim().to_string();
                model.display_name =
                    ActiveValue::Set((!display_name.is_empty()).then_some(display_name));
            }
            if let Some(category) = category {
                model.category = ActiveValue::Set(category);
            }
            if let Some(hidden) = patch.hidden {
                model.hidden = ActiveValue::Set(hidden);
            }
            let model = if model.is_changed() {
                model.update(&db_tx).await?
            } else {
                model.try_into_model()?
            };
            Ok(Account::from(model))
        })
    }

    /// Dashboard figures over the visible accounts.
    pub async fn dashboard(&self, user_id: &str) -> ResultEngine<DashboardSummary> {
        let settings = self.settings(user_id).await?;
        let accounts = self.accounts(user_id, false).await?;
        summarize(&accounts, settings.categories.list(CategoryKind::Account))
    }
}
