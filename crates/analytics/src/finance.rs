use crate::error::AnalyticsError;
use crate::filter::filter_rows_by_date;
use core_types::{ColumnBinding, ColumnRole, DateSelector, RecordSet};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to cents, half to even.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

fn overflow(what: &str) -> AnalyticsError {
    AnalyticsError::Calculation(format!("{} overflowed", what))
}

/// Total spent acquiring stock: the sum of `value * quantity` over all purchase
/// lines, optionally restricted to the selected days.
pub fn expenditure(
    purchases: &RecordSet,
    value_column: &str,
    quantity_column: &str,
    date_column: &str,
    selector: Option<&DateSelector>,
) -> Result<Decimal, AnalyticsError> {
    let filtered = filter_rows_by_date(purchases, date_column, selector)?;
    let value_idx = filtered.require_column(value_column)?;
    let quantity_idx = filtered.require_column(quantity_column)?;

    let mut total = Decimal::ZERO;
    for row in filtered.rows() {
        let value = row.get(value_idx).map(|v| v.as_decimal(value_column)).transpose()?.flatten();
        let quantity = row.get(quantity_idx).map(|v| v.as_decimal(quantity_column)).transpose()?.flatten();
        // A line missing either factor contributes nothing.
        let (Some(value), Some(quantity)) = (value, quantity) else {
            continue;
        };
        let line = value.checked_mul(quantity).ok_or_else(|| overflow("purchase line value"))?;
        total = total.checked_add(line).ok_or_else(|| overflow("expenditure"))?;
    }

    Ok(round_money(total))
}

/// Total revenue: the sum of `total_value_column` over all sales, optionally
/// restricted to the selected days.
pub fn total_revenue(
    sales: &RecordSet,
    total_value_column: &str,
    date_column: &str,
    selector: Option<&DateSelector>,
) -> Result<Decimal, AnalyticsError> {
    let filtered = filter_rows_by_date(sales, date_column, selector)?;

    let mut total = Decimal::ZERO;
    for value in filtered.column_values(total_value_column)? {
        if let Some(value) = value.as_decimal(total_value_column)? {
            total = total.checked_add(value).ok_or_else(|| overflow("total revenue"))?;
        }
    }

    Ok(round_money(total))
}

/// Profit for the period: revenue from `sales` minus the expenditure on
/// `purchases`.
///
/// The same selector is applied to each set independently, through each set's
/// own date column as named by its binding. Sales need the `TotalValue` and
/// `Date` roles bound; purchases need `UnitValue`, `Quantity` and `Date`.
pub fn profit(
    sales: &RecordSet,
    sales_columns: &ColumnBinding,
    purchases: &RecordSet,
    purchase_columns: &ColumnBinding,
    selector: Option<&DateSelector>,
) -> Result<Decimal, AnalyticsError> {
    let revenue = total_revenue(
        sales,
        sales_columns.column(ColumnRole::TotalValue)?,
        sales_columns.column(ColumnRole::Date)?,
        selector,
    )?;
    let spent = expenditure(
        purchases,
        purchase_columns.column(ColumnRole::UnitValue)?,
        purchase_columns.column(ColumnRole::Quantity)?,
        purchase_columns.column(ColumnRole::Date)?,
        selector,
    )?;

    tracing::debug!(%revenue, %spent, "Calculated profit");
    let net = revenue.checked_sub(spent).ok_or_else(|| overflow("profit"))?;
    Ok(round_money(net))
}
