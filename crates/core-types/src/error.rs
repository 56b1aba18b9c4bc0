use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A supplied value cannot be interpreted as the type its column requires.
    #[error("Invalid input for {0}: {1}")]
    InputType(String, String),

    /// A structurally invalid argument, such as a column missing from a record set.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
