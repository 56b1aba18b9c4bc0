//! # Tally Analytics
//!
//! Sales analytics over tabular record sets: date-range filtering, time-bucketed
//! aggregation, top-N rankings and the cost/revenue/profit figures of a period.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It performs no I/O and has
//!   no knowledge of where record sets come from or how results are displayed.
//! - **Stateless Calculation:** Every function takes its inputs by reference and
//!   returns new values. Input record sets are never modified, so any number of
//!   callers may run calculations over the same data at once.
//!
//! ## Public API
//!
//! - `filter_rows_by_date`: narrows a record set to a day, a list of days or an interval.
//! - `aggregate_by_bucket` and the `sales_per_*` family: totals and counts per time bucket.
//! - `top_n`, `top_selling_product`, `top_profitable_product`: rankings.
//! - `expenditure`, `total_revenue`, `profit`: scalar figures, rounded to cents.
//! - `AnalyticsEngine`: runs all of the above from the application settings and
//!   produces a `SalesReport`.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod engine;
pub mod error;
pub mod filter;
pub mod finance;
pub mod rank;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{
    aggregate_by_bucket, sales_per, sales_per_day, sales_per_hour, sales_per_month,
    sales_per_weekday, sales_per_year, weekday_rank, Bucket, TimeBucket, WEEKDAY_ORDER,
};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use filter::filter_rows_by_date;
pub use finance::{expenditure, profit, round_money, total_revenue};
pub use rank::{top_n, top_profitable_product, top_selling_product};
pub use report::{AggregationResult, Ranking, SalesReport};
