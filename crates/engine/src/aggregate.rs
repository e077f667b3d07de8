//! Category breakdown of balances.

use std::collections::HashMap;

use crate::{
    Category, ColorToken, MoneyCents, ResultEngine,
    categories::UNCATEGORIZED_LABEL,
    color::{resolve_color, top_level_of},
};

/// Something with a balance and an optional category name.
pub trait Categorized {
    fn balance(&self) -> &str;
    fn category(&self) -> Option<&str>;
}

/// One row of the breakdown: a top-level category (or `Uncategorized`) and
/// the net balance of everything filed under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub total: MoneyCents,
    pub color: ColorToken,
}

/// Groups `items` by top-level category and sums their balances.
///
/// - no category -> `Uncategorized`
/// - subcategory -> its top-level parent
/// - name not in the forest -> a bucket labelled with the raw name
///
/// Buckets with a net total `<= 0` are dropped. The rest keep the order in
/// which their label was first seen.
pub fn aggregate_by_category<T: Categorized>(
    items: &[T],
    categories: &[Category],
) -> ResultEngine<Vec<Bucket>> {
    let mut order: Vec<(String, MoneyCents)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let amount = MoneyCents::parse_balance(item.balance())?;
        let label = match item.category().filter(|c| !c.is_empty()) {
            None => UNCATEGORIZED_LABEL,
            Some(name) => top_level_of(name, categories).unwrap_or(name),
        };

        match index.get(label) {
            Some(&i) => order[i].1 = order[i].1.try_add(amount)?,
            None => {
                index.insert(label.to_string(), order.len());
                order.push((label.to_string(), amount));
            }
        }
    }

    Ok(order
        .into_iter()
        .filter(|(_, total)| total.is_positive())
        .map(|(label, total)| {
            let name = (label != UNCATEGORIZED_LABEL).then_some(label.as_str());
            let color = resolve_color(name, categories);
            Bucket {
                label,
                total,
                color,
            }
        })
        .collect())
}

/// Share of each bucket in the breakdown, in percent.
pub fn bucket_shares(buckets: &[Bucket]) -> Vec<f64> {
    let sum: f64 = buckets.iter().map(|b| b.total.cents() as f64).sum();
    buckets
        .iter()
        .map(|b| {
            if sum == 0.0 {
                0.0
            } else {
                b.total.cents() as f64 * 100.0 / sum
            }
        })
        .collect()
}
