//! Configuration loaders covering failure paths.

use std::sync::Arc;

use mocksql_config::{Config, OrthoConfig, OrthoError};

use crate::bootstrap::ConfigLoader;

/// Loader whose arguments name an unknown log format.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(["mocksql", "--log-filter", "off", "--log-format", "yaml"])
    }
}
