use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid limit: {0}, the limit must be a non-negative integer")]
    InvalidLimit(i64),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
