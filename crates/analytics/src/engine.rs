use crate::aggregate::{sales_per, TimeBucket};
use crate::error::AnalyticsError;
use crate::filter::filter_rows_by_date;
use crate::finance::{expenditure, profit, round_money, total_revenue};
use crate::rank::{top_profitable_product, top_selling_product};
use crate::report::{AggregationResult, Ranking, SalesReport};
use configuration::Settings;
use core_types::{ColumnBinding, ColumnRole, DateSelector, RangeOrder, RecordSet};
use rust_decimal::Decimal;

const SALES_ROLES: [ColumnRole; 5] = [
    ColumnRole::Date,
    ColumnRole::Id,
    ColumnRole::Product,
    ColumnRole::Quantity,
    ColumnRole::TotalValue,
];
const PURCHASE_ROLES: [ColumnRole; 3] = [ColumnRole::Date, ColumnRole::UnitValue, ColumnRole::Quantity];
const PRODUCT_ROLES: [ColumnRole; 3] = [ColumnRole::Product, ColumnRole::SalePrice, ColumnRole::CostPrice];
/// Sales columns a product ranking reads. The date is only needed with a selector.
const RANKED_SALES_ROLES: [ColumnRole; 2] = [ColumnRole::Product, ColumnRole::Quantity];

/// A stateless calculator that runs the sales analytics against record sets
/// whose columns are named by the application settings.
///
/// Every call validates the bindings against the supplied record sets once,
/// resolves the selector against the configured range-order policy, and then
/// delegates to the pure functions of this crate.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    sales: ColumnBinding,
    purchases: ColumnBinding,
    products: ColumnBinding,
    top_limit: i64,
    range_order: RangeOrder,
}

impl AnalyticsEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            sales: settings.sales.binding(),
            purchases: settings.purchases.binding(),
            products: settings.products.binding(),
            top_limit: settings.report.top_limit,
            range_order: settings.report.range_order,
        }
    }

    pub fn sales_binding(&self) -> &ColumnBinding {
        &self.sales
    }

    pub fn purchases_binding(&self) -> &ColumnBinding {
        &self.purchases
    }

    pub fn products_binding(&self) -> &ColumnBinding {
        &self.products
    }

    /// Applies the configured range-order policy to a caller's selector.
    pub fn resolve_selector(
        &self,
        selector: Option<DateSelector>,
    ) -> Result<Option<DateSelector>, AnalyticsError> {
        selector
            .map(|s| s.apply_range_order(self.range_order))
            .transpose()
            .map_err(AnalyticsError::from)
    }

    /// Best-selling products over the selected days. `limit` falls back to the
    /// configured default.
    pub fn top_selling(
        &self,
        sales: &RecordSet,
        selector: Option<DateSelector>,
        limit: Option<i64>,
        ascending: bool,
    ) -> Result<Ranking, AnalyticsError> {
        let selector = self.resolve_selector(selector)?;
        self.validate_ranked_sales(sales, selector.as_ref())?;
        let filtered = self.filter_sales(sales, selector.as_ref())?;

        self.rank_selling(&filtered, limit, ascending)
    }

    /// Most profitable products over the selected days of sales.
    pub fn top_profitable(
        &self,
        products: &RecordSet,
        sales: &RecordSet,
        selector: Option<DateSelector>,
        limit: Option<i64>,
        ascending: bool,
    ) -> Result<Ranking, AnalyticsError> {
        self.products.validate(products, &PRODUCT_ROLES)?;
        let selector = self.resolve_selector(selector)?;
        self.validate_ranked_sales(sales, selector.as_ref())?;
        let filtered = self.filter_sales(sales, selector.as_ref())?;

        self.rank_profitable(products, &filtered, limit, ascending)
    }

    /// Sales totals and counts per time bucket.
    pub fn sales_per(
        &self,
        sales: &RecordSet,
        bucket: TimeBucket,
        selector: Option<DateSelector>,
    ) -> Result<AggregationResult, AnalyticsError> {
        self.sales.validate(sales, &SALES_ROLES)?;
        let selector = self.resolve_selector(selector)?;
        let filtered = self.filter_sales(sales, selector.as_ref())?;

        self.series(&filtered, bucket)
    }

    /// Revenue minus expenditure over the selected days.
    pub fn profit(
        &self,
        sales: &RecordSet,
        purchases: &RecordSet,
        selector: Option<DateSelector>,
    ) -> Result<Decimal, AnalyticsError> {
        self.sales.validate(sales, &SALES_ROLES)?;
        self.purchases.validate(purchases, &PURCHASE_ROLES)?;
        let selector = self.resolve_selector(selector)?;

        profit(sales, &self.sales, purchases, &self.purchases, selector.as_ref())
    }

    /// The main entry point: computes the full `SalesReport` for a period.
    ///
    /// Bindings are validated and the sales are filtered once; every figure of
    /// the report is then derived from that filtered set.
    pub fn calculate(
        &self,
        sales: &RecordSet,
        purchases: &RecordSet,
        products: &RecordSet,
        selector: Option<DateSelector>,
    ) -> Result<SalesReport, AnalyticsError> {
        self.sales.validate(sales, &SALES_ROLES)?;
        self.purchases.validate(purchases, &PURCHASE_ROLES)?;
        self.products.validate(products, &PRODUCT_ROLES)?;
        let selector = self.resolve_selector(selector)?;

        tracing::info!(
            sales = sales.len(),
            purchases = purchases.len(),
            products = products.len(),
            "Calculating sales report"
        );

        let filtered = self.filter_sales(sales, selector.as_ref())?;

        // The selector has already been applied to `filtered`.
        let total_revenue = total_revenue(
            &filtered,
            self.sales.column(ColumnRole::TotalValue)?,
            self.sales.column(ColumnRole::Date)?,
            None,
        )?;
        let expenditure = expenditure(
            purchases,
            self.purchases.column(ColumnRole::UnitValue)?,
            self.purchases.column(ColumnRole::Quantity)?,
            self.purchases.column(ColumnRole::Date)?,
            selector.as_ref(),
        )?;
        let profit = total_revenue
            .checked_sub(expenditure)
            .map(round_money)
            .ok_or_else(|| AnalyticsError::Calculation("profit overflowed".to_string()))?;

        Ok(SalesReport {
            total_revenue,
            expenditure,
            profit,
            top_selling: self.rank_selling(&filtered, None, false)?,
            top_profitable: self.rank_profitable(products, &filtered, None, false)?,
            sales_per_weekday: self.series(&filtered, TimeBucket::Weekday)?,
            sales_per_hour: self.series(&filtered, TimeBucket::Hour)?,
            selector,
        })
    }

    fn validate_ranked_sales(
        &self,
        sales: &RecordSet,
        selector: Option<&DateSelector>,
    ) -> Result<(), AnalyticsError> {
        self.sales.validate(sales, &RANKED_SALES_ROLES)?;
        if selector.is_some() {
            self.sales.validate(sales, &[ColumnRole::Date])?;
        }
        Ok(())
    }

    fn filter_sales(
        &self,
        sales: &RecordSet,
        selector: Option<&DateSelector>,
    ) -> Result<RecordSet, AnalyticsError> {
        match selector {
            Some(_) => filter_rows_by_date(sales, self.sales.column(ColumnRole::Date)?, selector),
            None => Ok(sales.clone()),
        }
    }

    fn rank_selling(
        &self,
        sales: &RecordSet,
        limit: Option<i64>,
        ascending: bool,
    ) -> Result<Ranking, AnalyticsError> {
        top_selling_product(
            sales,
            self.sales.column(ColumnRole::Product)?,
            self.sales.column(ColumnRole::Quantity)?,
            limit.unwrap_or(self.top_limit),
            ascending,
        )
    }

    fn rank_profitable(
        &self,
        products: &RecordSet,
        sales: &RecordSet,
        limit: Option<i64>,
        ascending: bool,
    ) -> Result<Ranking, AnalyticsError> {
        top_profitable_product(
            products,
            sales,
            self.products.column(ColumnRole::Product)?,
            self.products.column(ColumnRole::SalePrice)?,
            self.products.column(ColumnRole::CostPrice)?,
            self.sales.column(ColumnRole::Quantity)?,
            limit.unwrap_or(self.top_limit),
            ascending,
        )
    }

    fn series(&self, sales: &RecordSet, bucket: TimeBucket) -> Result<AggregationResult, AnalyticsError> {
        sales_per(
            sales,
            bucket,
            self.sales.column(ColumnRole::TotalValue)?,
            self.sales.column(ColumnRole::Date)?,
            self.sales.column(ColumnRole::Id)?,
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{parse_date, CoreError, Value};
    use rust_decimal_macros::dec;

    fn sales() -> RecordSet {
        RecordSet::from_rows(
            &["id", "date", "product", "quantity", "total_value"],
            vec![
                vec![Value::from(1), Value::from("2024-01-01 09:15:00"), Value::from("Coffee"), Value::from(2), Value::from(dec!(11.00))],
                vec![Value::from(2), Value::from("2024-01-01 16:40:00"), Value::from("Cake"), Value::from(1), Value::from(dec!(12.00))],
                vec![Value::from(3), Value::from("2024-01-02 09:05:00"), Value::from("Coffee"), Value::from(3), Value::from(dec!(16.50))],
                vec![Value::from(4), Value::from("2024-01-05 10:30:00"), Value::from("Tea"), Value::from(1), Value::from(dec!(4.00))],
            ],
        )
        .unwrap()
    }

    fn purchases() -> RecordSet {
        RecordSet::from_rows(
            &["date", "value", "quantity"],
            vec![
                vec![Value::from("2024-01-01"), Value::from(dec!(2.00)), Value::from(5)],
                vec![Value::from("2024-01-04"), Value::from(dec!(7.00)), Value::from(2)],
            ],
        )
        .unwrap()
    }

    fn products() -> RecordSet {
        RecordSet::from_rows(
            &["product", "sale_price", "cost_price"],
            vec![
                vec![Value::from("Coffee"), Value::from(dec!(5.50)), Value::from(dec!(2.00))],
                vec![Value::from("Cake"), Value::from(dec!(12.00)), Value::from(dec!(7.00))],
                vec![Value::from("Tea"), Value::from(dec!(4.00)), Value::from(dec!(1.00))],
            ],
        )
        .unwrap()
    }

    fn day(s: &str) -> chrono::NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_calculate_full_report() {
        let engine = AnalyticsEngine::new(&Settings::default());
        let report = engine.calculate(&sales(), &purchases(), &products(), None).unwrap();

        assert_eq!(report.total_revenue, dec!(43.50));
        assert_eq!(report.expenditure, dec!(24.00));
        assert_eq!(report.profit, dec!(19.50));

        assert_eq!(report.top_selling.keys[0], Value::from("Coffee"));
        assert_eq!(report.top_selling.values[0], dec!(5));

        // Coffee 3.50 * 5 = 17.50, Cake 5.00, Tea 3.00
        assert_eq!(report.top_profitable.values, vec![dec!(17.50), dec!(5.00), dec!(3.00)]);

        assert_eq!(report.sales_per_weekday.labels, vec!["Monday", "Tuesday", "Friday"]);
        assert_eq!(report.sales_per_hour.labels, vec!["09:00", "10:00", "16:00"]);
        assert_eq!(report.sales_per_hour.counts, vec![2, 1, 1]);
    }

    #[test]
    fn test_range_order_policy_is_applied() {
        let reversed = DateSelector::interval(day("2024-01-02"), day("2024-01-01"));

        let literal = AnalyticsEngine::new(&Settings::default());
        let ranking = literal.top_selling(&sales(), Some(reversed.clone()), None, false).unwrap();
        assert!(ranking.is_empty());

        let mut settings = Settings::default();
        settings.report.range_order = RangeOrder::Swap;
        let swapping = AnalyticsEngine::new(&settings);
        let ranking = swapping.top_selling(&sales(), Some(reversed.clone()), None, false).unwrap();
        assert_eq!(ranking.keys, vec![Value::from("Coffee"), Value::from("Cake")]);

        settings.report.range_order = RangeOrder::Reject;
        let rejecting = AnalyticsEngine::new(&settings);
        let err = rejecting.profit(&sales(), &purchases(), Some(reversed)).unwrap_err();
        assert!(matches!(err, AnalyticsError::Core(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_bound_column_is_rejected_up_front() {
        let engine = AnalyticsEngine::new(&Settings::default());
        let no_ids = RecordSet::from_rows(
            &["date", "product", "quantity", "total_value"],
            Vec::<Vec<Value>>::new(),
        )
        .unwrap();
        let err = engine.sales_per(&no_ids, TimeBucket::Day, None).unwrap_err();
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_explicit_limit_overrides_default() {
        let engine = AnalyticsEngine::new(&Settings::default());
        let ranking = engine.top_selling(&sales(), None, Some(1), true).unwrap();
        assert_eq!(ranking.keys, vec![Value::from("Cake")]);
    }

    #[test]
    fn test_report_profit_matches_standalone_profit() {
        let engine = AnalyticsEngine::new(&Settings::default());
        let selector = DateSelector::interval(day("2024-01-01"), day("2024-01-02"));
        let report = engine
            .calculate(&sales(), &purchases(), &products(), Some(selector.clone()))
            .unwrap();
        let standalone = engine.profit(&sales(), &purchases(), Some(selector)).unwrap();

        // 11.00 + 12.00 + 16.50 - 2.00 * 5
        assert_eq!(report.total_revenue, dec!(39.50));
        assert_eq!(report.profit, dec!(29.50));
        assert_eq!(report.profit, standalone);
        assert_eq!(report.top_selling.keys, vec![Value::from("Coffee"), Value::from("Cake")]);
    }

    #[test]
    fn test_product_rankings_need_only_product_and_quantity() {
        let engine = AnalyticsEngine::new(&Settings::default());
        let sold = RecordSet::from_rows(
            &["product", "quantity"],
            vec![
                vec![Value::from("Coffee"), Value::from(4)],
                vec![Value::from("Tea"), Value::from(1)],
            ],
        )
        .unwrap();

        let selling = engine.top_selling(&sold, None, None, false).unwrap();
        assert_eq!(selling.keys, vec![Value::from("Coffee"), Value::from("Tea")]);

        let profitable = engine.top_profitable(&products(), &sold, None, None, false).unwrap();
        // Coffee 3.50 * 4 = 14.00, Tea 3.00 * 1
        assert_eq!(profitable.values, vec![dec!(14.00), dec!(3.00)]);

        // Filtering by date needs the date column.
        let err = engine
            .top_profitable(&products(), &sold, Some(DateSelector::single(day("2024-01-01"))), None, false)
            .unwrap_err();
        assert!(err.to_string().contains("'date'"));
    }
}
