//! Process configuration (environment + arguments).

use std::path::PathBuf;

/// Environment variable naming the inventory file.
pub const FILE_ENV: &str = "STOCKROOM_FILE";

/// Inventory file used when nothing else is configured.
pub const DEFAULT_FILE: &str = "inventario.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub file: PathBuf,
}

impl CliConfig {
    /// Resolve the configuration: first positional argument, then
    /// [`FILE_ENV`], then [`DEFAULT_FILE`].
    pub fn resolve(mut args: impl Iterator<Item = String>, env_file: Option<String>) -> Self {
        let usable = |f: &String| !f.trim().is_empty();
        let file = args
            .next()
            .filter(usable)
            .or_else(|| env_file.filter(usable))
            .unwrap_or_else(|| {
                tracing::debug!("{FILE_ENV} not set; using {DEFAULT_FILE}");
                DEFAULT_FILE.to_string()
            });

        Self {
            file: PathBuf::from(file),
        }
    }

    /// Resolve from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().skip(1), std::env::var(FILE_ENV).ok())
    }
}
