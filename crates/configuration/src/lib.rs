use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ProductColumns, PurchaseColumns, ReportSettings, SalesColumns, Settings};

/// Prefix of the environment variables that override file values,
/// e.g. `TALLY__REPORT__TOP_LIMIT=10`.
const ENV_PREFIX: &str = "TALLY";

/// Loads the application configuration from an optional `tally.toml` in the
/// working directory.
///
/// This function is the primary entry point for this crate. A missing file is
/// not an error: every setting has a default.
pub fn load_config() -> Result<Settings, ConfigError> {
    let source = config::File::with_name("tally").required(false);
    build(source)
}

/// Loads the configuration from an explicit file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    tracing::debug!(path = %path.display(), "Loading configuration file");
    build(config::File::from(path))
}

fn build<S>(file: S) -> Result<Settings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
