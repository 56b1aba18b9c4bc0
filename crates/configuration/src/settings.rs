use crate::error::ConfigError;
use core_types::{ColumnBinding, ColumnRole, RangeOrder};
use serde::{Deserialize, Serialize};

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so a partial `tally.toml` (or none at all) is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub report: ReportSettings,
    pub sales: SalesColumns,
    pub purchases: PurchaseColumns,
    pub products: ProductColumns,
}

/// Defaults applied to reports when the caller does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// How many entries the top-N rankings keep.
    pub top_limit: i64,
    /// What to do with a two-date interval given in reverse chronological order.
    pub range_order: RangeOrder,
}

/// Column names of the sales record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    pub date: String,
    pub id: String,
    pub product: String,
    pub quantity: String,
    /// Full amount charged for the sale.
    pub total_value: String,
}

/// Column names of the purchases (stock acquisition) record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseColumns {
    pub date: String,
    /// Price paid per unit.
    pub unit_value: String,
    pub quantity: String,
}

/// Column names of the product catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductColumns {
    /// Join key against the sales record set. Must match `sales.product`.
    pub product: String,
    pub sale_price: String,
    pub cost_price: String,
}

// --- Default Implementations ---

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_limit: 5,
            range_order: RangeOrder::default(),
        }
    }
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            id: "id".to_string(),
            product: "product".to_string(),
            quantity: "quantity".to_string(),
            total_value: "total_value".to_string(),
        }
    }
}

impl Default for PurchaseColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            unit_value: "value".to_string(),
            quantity: "quantity".to_string(),
        }
    }
}

impl Default for ProductColumns {
    fn default() -> Self {
        Self {
            product: "product".to_string(),
            sale_price: "sale_price".to_string(),
            cost_price: "cost_price".to_string(),
        }
    }
}

// --- Bindings ---

impl SalesColumns {
    pub fn binding(&self) -> ColumnBinding {
        ColumnBinding::new()
            .with(ColumnRole::Date, &self.date)
            .with(ColumnRole::Id, &self.id)
            .with(ColumnRole::Product, &self.product)
            .with(ColumnRole::Quantity, &self.quantity)
            .with(ColumnRole::TotalValue, &self.total_value)
    }
}

impl PurchaseColumns {
    pub fn binding(&self) -> ColumnBinding {
        ColumnBinding::new()
            .with(ColumnRole::Date, &self.date)
            .with(ColumnRole::UnitValue, &self.unit_value)
            .with(ColumnRole::Quantity, &self.quantity)
    }
}

impl ProductColumns {
    pub fn binding(&self) -> ColumnBinding {
        ColumnBinding::new()
            .with(ColumnRole::Product, &self.product)
            .with(ColumnRole::SalePrice, &self.sale_price)
            .with(ColumnRole::CostPrice, &self.cost_price)
    }
}

impl Settings {
    /// Checks the settings for values that would only fail later, mid-calculation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.top_limit < 0 {
            return Err(ConfigError::ValidationError(format!(
                "report.top_limit must be non-negative, got {}",
                self.report.top_limit
            )));
        }

        let bindings = [
            ("sales", self.sales.binding()),
            ("purchases", self.purchases.binding()),
            ("products", self.products.binding()),
        ];
        for (section, binding) in &bindings {
            if let Some((role, _)) = binding.iter().find(|(_, column)| column.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "{}.{} must name a column",
                    section,
                    role.as_str()
                )));
            }
        }

        if self.sales.product != self.products.product {
            return Err(ConfigError::ValidationError(format!(
                "sales.product ('{}') and products.product ('{}') must name the same join column",
                self.sales.product, self.products.product
            )));
        }

        Ok(())
    }
}
