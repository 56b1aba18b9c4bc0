use serde::{Deserialize, Serialize};

/// The semantic role a column plays in a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Id,
    Product,
    Quantity,
    /// Price of a single unit on a purchase line.
    UnitValue,
    /// Full amount of a sale.
    TotalValue,
    SalePrice,
    CostPrice,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Id => "id",
            ColumnRole::Product => "product",
            ColumnRole::Quantity => "quantity",
            ColumnRole::UnitValue => "unit_value",
            ColumnRole::TotalValue => "total_value",
            ColumnRole::SalePrice => "sale_price",
            ColumnRole::CostPrice => "cost_price",
        }
    }
}

/// How a two-date interval whose start falls after its end is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOrder {
    /// Positional: the first date is the start, the second the end. A reversed
    /// interval matches nothing.
    #[default]
    Literal,
    /// Reorder the two dates chronologically.
    Swap,
    /// Fail with an invalid-argument error.
    Reject,
}
