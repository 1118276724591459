//! Configuration and store shared by every command

use anyhow::Context as _;
use std::path::{Path, PathBuf};

use menugraph_core::catalog::{catalog_schema, find_dish, StalenessPolicy};
use menugraph_core::errors::{ExError, ExErrorKind};
use menugraph_core::{EngineConfig, Handle, ObjectStore};

pub const DEFAULT_CONFIG_PATH: &str = ".menugraph/config.toml";

pub struct Context {
    pub config: EngineConfig,
    pub store: ObjectStore,
}

impl Context {
    /// Load the configuration, then open the store at `--db` or the configured path
    pub fn load(db: Option<PathBuf>, config_path: &Path) -> anyhow::Result<Self> {
        let config = EngineConfig::load(config_path)
            .map_err(ExError::from)
            .with_context(|| format!("loading {}", config_path.display()))?;
        let db_path = db.unwrap_or_else(|| config.store.db_path.clone());
        tracing::debug!(db = %db_path.display(), "opening store");

        let store = menugraph_store::open_store(&db_path, catalog_schema())
            .with_context(|| format!("opening {}", db_path.display()))?;
        Ok(Self { config, store })
    }

    pub fn policy(&self) -> StalenessPolicy {
        StalenessPolicy::from(&self.config.catalog)
    }

    pub fn currency(&self) -> &str {
        &self.config.catalog.currency_suffix
    }

    /// Handle of the dish with `external_id`
    pub fn dish(&self, external_id: &str) -> Result<Handle, ExError> {
        find_dish(&self.store, external_id).ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_entity_kind("Dish")
                .with_message(format!("No dish with id '{}'", external_id))
        })
    }
}
