//! Dashboard figures computed from a user's accounts.

use crate::{
    Account, Bucket, Category, ColorToken, MoneyCents, ResultEngine,
    aggregate::aggregate_by_category,
};

/// Number of accounts filed under a top-level category or its subcategories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub color: ColorToken,
    pub accounts: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardSummary {
    pub net_worth: MoneyCents,
    pub total_assets: MoneyCents,
    /// Sum of negative balances, as a positive amount.
    pub total_liabilities: MoneyCents,
    pub asset_accounts: usize,
    pub liability_accounts: usize,
    /// Most recent balance date (unix seconds) across all accounts.
    pub latest_balance_date: Option<i64>,
    pub category_counts: Vec<CategoryCount>,
    pub uncategorized_accounts: usize,
    pub breakdown: Vec<Bucket>,
}

pub fn summarize(accounts: &[Account], categories: &[Category]) -> ResultEngine<DashboardSummary> {
    let mut net_worth = MoneyCents::ZERO;
    let mut total_assets = MoneyCents::ZERO;
    let mut total_liabilities = MoneyCents::ZERO;
    let mut asset_accounts = 0;
    let mut liability_accounts = 0;

    for account in accounts {
        let balance = MoneyCents::parse_balance(&account.balance)?;
        net_worth = net_worth.try_add(balance)?;
        if balance.is_positive() {
            total_assets = total_assets.try_add(balance)?;
            asset_accounts += 1;
        } else if balance.is_negative() {
            total_liabilities = total_liabilities.try_add(balance.abs())?;
            liability_accounts += 1;
        }
    }

    let latest_balance_date = accounts.iter().filter_map(|a| a.sf_balance_date).max();

    let category_counts = categories
        .iter()
        .map(|category| {
            let accounts = accounts
                .iter()
                .filter(|a| {
                    a.category.as_deref().is_some_and(|name| {
                        name == category.name
                            || category.subcategories.iter().any(|sub| sub.name == name)
                    })
                })
                .count();
            CategoryCount {
                name: category.name.clone(),
                color: category.color.clone(),
                accounts,
            }
        })
        .collect();

    let uncategorized_accounts = accounts
        .iter()
        .filter(|a| a.category.as_deref().is_none_or(str::is_empty))
        .count();

    Ok(DashboardSummary {
        net_worth,
        total_assets,
        total_liabilities,
        asset_accounts,
        liability_accounts,
        latest_balance_date,
        category_counts,
        uncategorized_accounts,
        breakdown: aggregate_by_category(accounts, categories)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, balance: &str, category: Option<&str>, date: Option<i64>) -> Account {
        Account {
            sf_account_id: id.to_string(),
            display_name: None,
            sf_account_name: Some(id.to_string()),
            sf_name: Some("Bank".to_string()),
            balance: balance.to_string(),
            sf_balance_date: date,
            source: crate::accounts::SOURCE_BRIDGE.to_string(),
            category: category.map(str::to_string),
            hidden: false,
        }
    }

    #[test]
    fn totals_and_counts() {
        let categories = vec![
            Category::new("Checking", "green.500")
                .with_subcategories(vec![Category::new("Joint", "green.500")]),
            Category::new("Credit Card", "red.500"),
        ];
        let accounts = vec![
            account("a", "1200.50", Some("Checking"), Some(1_700_000_000)),
            account("b", "300", Some("Joint"), Some(1_700_000_500)),
            account("c", "-450.25", Some("Credit Card"), None),
            account("d", "0", None, Some(1_600_000_000)),
        ];

        let summary = summarize(&accounts, &categories).unwrap();
        assert_eq!(summary.net_worth, MoneyCents::new(105_025));
        assert_eq!(summary.total_assets, MoneyCents::new(150_050));
        assert_eq!(summary.total_liabilities, MoneyCents::new(45_025));
        assert_eq!(summary.asset_accounts, 2);
        assert_eq!(summary.liability_accounts, 1);
        assert_eq!(summary.latest_balance_date, Some(1_700_000_500));
        assert_eq!(summary.category_counts[0].accounts, 2);
        assert_eq!(summary.category_counts[1].accounts, 1);
        assert_eq!(summary.uncategorized_accounts, 1);

        assert_eq!(summary.breakdown.len(), 1);
        assert_eq!(summary.breakdown[0].label, "Checking");
        assert_eq!(summary.breakdown[0].total, MoneyCents::new(150_050));
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let accounts = vec![
            account("a", "90000000000000000", None, None),
            account("b", "90000000000000000", None, None),
        ];
        assert!(matches!(
            summarize(&accounts, &[]),
            Err(crate::EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn empty_accounts() {
        let summary = summarize(&[], &[]).unwrap();
        assert_eq!(summary.net_worth, MoneyCents::ZERO);
        assert_eq!(summary.latest_balance_date, None);
        assert!(summary.breakdown.is_empty());
    }
}
