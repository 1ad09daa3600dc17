//! Subcommands of the `fiskal` binary.

pub mod batch;
pub mod config;
pub mod output;
pub mod parse;
pub mod url;

use std::path::Path;

use tracing::debug;

use fiskal_core::FiskalConfig;

/// Load the config given with `--config`, else the default file if it exists.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FiskalConfig> {
    if let Some(path) = config_path {
        return Ok(FiskalConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(FiskalConfig::from_file(&default_path)?)
    } else {
        Ok(FiskalConfig::default())
    }
}
