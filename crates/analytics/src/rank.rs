use crate::error::AnalyticsError;
use crate::finance::round_money;
use crate::report::Ranking;
use core_types::{RecordSet, Value};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

fn check_limit(limit: i64) -> Result<usize, AnalyticsError> {
    usize::try_from(limit).map_err(|_| AnalyticsError::InvalidLimit(limit))
}

/// Sums `value_column` per distinct `key_column` value, keys in ascending order.
/// Rows with an empty key are not grouped; empty values add nothing.
fn sum_by_key(
    records: &RecordSet,
    key_column: &str,
    value_column: &str,
) -> Result<BTreeMap<Value, Decimal>, AnalyticsError> {
    let key_idx = records.require_column(key_column)?;
    let value_idx = records.require_column(value_column)?;

    let mut sums: BTreeMap<Value, Decimal> = BTreeMap::new();
    for row in records.rows() {
        let Some(key) = row.get(key_idx).filter(|k| !k.is_null()) else {
            continue;
        };
        let value = match row.get(value_idx) {
            Some(v) => v.as_decimal(value_column)?.unwrap_or(Decimal::ZERO),
            None => Decimal::ZERO,
        };
        let sum = sums.entry(key.clone()).or_insert(Decimal::ZERO);
        *sum = sum.checked_add(value).ok_or_else(|| {
            AnalyticsError::Calculation(format!("sum of '{}' overflowed", value_column))
        })?;
    }
    Ok(sums)
}

/// Sorts entries by value and keeps the first `limit`.
///
/// The sort is stable: entries with equal values keep the order they arrive in,
/// which for grouped data is ascending key order.
fn rank_entries(mut entries: Vec<(Value, Decimal)>, limit: usize, ascending: bool) -> Ranking {
    entries.sort_by(|a, b| {
        let order: Ordering = a.1.cmp(&b.1);
        if ascending { order } else { order.reverse() }
    });
    entries.truncate(limit);

    let (keys, values) = entries.into_iter().unzip();
    Ranking { keys, values }
}

/// Groups by `group_key_column`, sums `quantity_column` per group and returns
/// the `limit` largest groups (smallest when `ascending`).
///
/// A negative limit is rejected before anything is computed; a limit of zero
/// yields an empty ranking.
pub fn top_n(
    records: &RecordSet,
    group_key_column: &str,
    quantity_column: &str,
    limit: i64,
    ascending: bool,
) -> Result<Ranking, AnalyticsError> {
    let limit = check_limit(limit)?;
    let sums = sum_by_key(records, group_key_column, quantity_column)?;

    tracing::debug!(groups = sums.len(), limit, ascending, "Ranking groups");
    Ok(rank_entries(sums.into_iter().collect(), limit, ascending))
}

/// The best (or worst, when `ascending`) selling products by quantity sold.
pub fn top_selling_product(
    sales: &RecordSet,
    product_column: &str,
    quantity_column: &str,
    limit: i64,
    ascending: bool,
) -> Result<Ranking, AnalyticsError> {
    top_n(sales, product_column, quantity_column, limit, ascending)
}

/// The products that generated the most (or least, when `ascending`) profit.
///
/// Per-unit profit (`sale_price - cost_price`) comes from the product catalogue
/// and is multiplied by the quantity sold per product. Products are matched on
/// `product_column` in both sets (inner join): catalogue entries with no sales
/// and sales of unknown products both drop out. Profits are rounded to two
/// decimal places on return.
#[allow(clippy::too_many_arguments)]
pub fn top_profitable_product(
    products: &RecordSet,
    sales: &RecordSet,
    product_column: &str,
    sale_price_column: &str,
    cost_price_column: &str,
    quantity_column: &str,
    limit: i64,
    ascending: bool,
) -> Result<Ranking, AnalyticsError> {
    let limit = check_limit(limit)?;

    let key_idx = products.require_column(product_column)?;
    let sale_idx = products.require_column(sale_price_column)?;
    let cost_idx = products.require_column(cost_price_column)?;

    // A product may appear more than once in the catalogue; each entry joins.
    let mut unit_profits: BTreeMap<&Value, Vec<Decimal>> = BTreeMap::new();
    for row in products.rows() {
        let Some(key) = row.get(key_idx).filter(|k| !k.is_null()) else {
            continue;
        };
        let sale_price = row.get(sale_idx).map(|v| v.as_decimal(sale_price_column)).transpose()?.flatten();
        let cost_price = row.get(cost_idx).map(|v| v.as_decimal(cost_price_column)).transpose()?.flatten();
        let (Some(sale_price), Some(cost_price)) = (sale_price, cost_price) else {
            tracing::warn!(product = %key, "Skipping product without both a sale and a cost price");
            continue;
        };
        let unit_profit = sale_price.checked_sub(cost_price).ok_or_else(|| {
            AnalyticsError::Calculation(format!("unit profit of product '{}' overflowed", key))
        })?;
        unit_profits.entry(key).or_default().push(unit_profit);
    }

    let sold = sum_by_key(sales, product_column, quantity_column)?;

    let mut entries = Vec::new();
    let mut unmatched = 0usize;
    for (key, quantity) in sold {
        let Some(profits) = unit_profits.get(&key) else {
            unmatched += 1;
            continue;
        };
        for unit_profit in profits {
            let total = unit_profit.checked_mul(quantity).ok_or_else(|| {
                AnalyticsError::Calculation(format!("profit of product '{}' overflowed", key))
            })?;
            entries.push((key.clone(), total));
        }
    }
    if unmatched > 0 {
        tracing::warn!(unmatched, "Sold products missing from the catalogue were left out");
    }

    let mut ranking = rank_entries(entries, limit, ascending);
    ranking.values = ranking.values.into_iter().map(round_money).collect();
    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quantities(rows: &[(&str, i32)]) -> RecordSet {
        RecordSet::from_rows(
            &["product", "quantity"],
            rows.iter().map(|(p, q)| vec![Value::from(*p), Value::from(*q)]),
        )
        .unwrap()
    }

    fn keys(ranking: &Ranking) -> Vec<String> {
        ranking.keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_top_n_example() {
        let records = quantities(&[("A", 5), ("B", 15), ("C", 10)]);
        let ranking = top_n(&records, "product", "quantity", 2, false).unwrap();

        assert_eq!(keys(&ranking), vec!["B", "C"]);
        assert_eq!(ranking.values, vec![dec!(15), dec!(10)]);
    }

    #[test]
    fn test_top_n_sums_groups_and_sorts_ascending() {
        let records = quantities(&[("A", 5), ("B", 1), ("A", 2), ("C", 4), ("B", 2)]);
        let ranking = top_n(&records, "product", "quantity", 10, true).unwrap();

        assert_eq!(keys(&ranking), vec!["B", "C", "A"]);
        assert_eq!(ranking.values, vec![dec!(3), dec!(4), dec!(7)]);
    }

    #[test]
    fn test_top_n_limit_edges() {
        let records = quantities(&[("A", 5), ("B", 15)]);

        let empty = top_n(&records, "product", "quantity", 0, false).unwrap();
        assert!(empty.is_empty());

        let err = top_n(&records, "product", "quantity", -1, false).unwrap_err();
        assert_eq!(err, AnalyticsError::InvalidLimit(-1));
    }

    #[test]
    fn test_negative_limit_is_rejected_before_column_lookup() {
        let records = quantities(&[("A", 5)]);
        let err = top_n(&records, "missing", "quantity", -3, false).unwrap_err();
        assert_eq!(err, AnalyticsError::InvalidLimit(-3));
    }

    #[test]
    fn test_ties_keep_ascending_key_order() {
        let records = quantities(&[("pear", 3), ("apple", 3), ("fig", 9), ("kiwi", 3)]);
        let ranking = top_n(&records, "product", "quantity", 3, false).unwrap();
        assert_eq!(keys(&ranking), vec!["fig", "apple", "kiwi"]);
    }

    fn catalogue() -> RecordSet {
        RecordSet::from_rows(
            &["product", "sale_price", "cost_price"],
            vec![
                vec![Value::from("Coffee"), Value::from(dec!(5.50)), Value::from(dec!(2.125))],
                vec![Value::from("Cake"), Value::from(dec!(12.00)), Value::from(dec!(7.00))],
                vec![Value::from("Tea"), Value::from(dec!(4.00)), Value::from(dec!(1.00))],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_top_profitable_product_joins_and_rounds() {
        let sales = quantities(&[("Coffee", 3), ("Cake", 1), ("Coffee", 1), ("Juice", 50)]);
        let ranking = top_profitable_product(
            &catalogue(),
            &sales,
            "product",
            "sale_price",
            "cost_price",
            "quantity",
            5,
            false,
        )
        .unwrap();

        // Coffee: 3.375 * 4 = 13.5; Cake: 5 * 1 = 5. Tea never sold, Juice unknown.
        assert_eq!(keys(&ranking), vec!["Coffee", "Cake"]);
        assert_eq!(ranking.values, vec![dec!(13.50), dec!(5.00)]);
    }

    #[test]
    fn test_top_profitable_rounds_half_to_even() {
        let products = RecordSet::from_rows(
            &["product", "sale_price", "cost_price"],
            vec![vec![Value::from("Bun"), Value::from(dec!(1.125)), Value::from(dec!(0))]],
        )
        .unwrap();
        let sales = quantities(&[("Bun", 1)]);
        let ranking = top_profitable_product(
            &products, &sales, "product", "sale_price", "cost_price", "quantity", 1, false,
        )
        .unwrap();
        assert_eq!(ranking.values, vec![dec!(1.12)]);
    }

    #[test]
    fn test_top_profitable_rejects_negative_limit() {
        let sales = quantities(&[("Coffee", 1)]);
        let err = top_profitable_product(
            &catalogue(), &sales, "product", "sale_price", "cost_price", "quantity", -2, false,
        )
        .unwrap_err();
        assert_eq!(err, AnalyticsError::InvalidLimit(-2));
    }

    #[test]
    fn test_top_profitable_unit_profit_overflow_is_an_error() {
        let products = RecordSet::from_rows(
            &["product", "sale_price", "cost_price"],
            vec![vec![Value::from("Gold"), Value::from(Decimal::MAX), Value::from(-1)]],
        )
        .unwrap();
        let sales = quantities(&[("Gold", 1)]);
        let err = top_profitable_product(
            &products, &sales, "product", "sale_price", "cost_price", "quantity", 1, false,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::Calculation(_)));
    }
}
