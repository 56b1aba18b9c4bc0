use crate::enums::ColumnRole;
use crate::error::CoreError;
use crate::record::RecordSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names the columns of one record set that play each semantic role.
///
/// Bindings are supplied by the caller and are never inferred from the data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    roles: BTreeMap<ColumnRole, String>,
}

impl ColumnBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `role` to `column`, replacing any earlier binding for that role.
    pub fn with(mut self, role: ColumnRole, column: impl Into<String>) -> Self {
        self.roles.insert(role, column.into());
        self
    }

    /// The column bound to `role`, or an invalid-argument error when unbound.
    pub fn column(&self, role: ColumnRole) -> Result<&str, CoreError> {
        self.roles.get(&role).map(String::as_str).ok_or_else(|| {
            CoreError::InvalidArgument(format!("no column bound to role '{}'", role.as_str()))
        })
    }

    /// Checks once, at the boundary, that every role in `required` is bound and
    /// that the bound column exists in `records`.
    pub fn validate(&self, records: &RecordSet, required: &[ColumnRole]) -> Result<(), CoreError> {
        for role in required {
            let column = self.column(*role)?;
            records.require_column(column).map_err(|_| {
                CoreError::InvalidArgument(format!(
                    "column '{}' bound to role '{}' is missing from the record set",
                    column,
                    role.as_str()
                ))
            })?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, &str)> {
        self.roles.iter().map(|(role, col)| (*role, col.as_str()))
    }
}
