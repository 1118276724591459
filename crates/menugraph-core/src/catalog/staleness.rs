//! Time-based refresh policy

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::queries::{catalog_state, CatalogState};
use crate::config::CatalogConfig;
use crate::store::ObjectStore;

/// Decides when a cached catalog is too old
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub refresh_interval: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            refresh_interval: CatalogConfig::default().refresh_interval(),
        }
    }
}

impl From<&CatalogConfig> for StalenessPolicy {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
        }
    }
}

impl StalenessPolicy {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }

    /// True when nothing was ever fetched or the last fetch is older than
    /// the refresh interval at `now`
    ///
    /// A timestamp in the future counts as fresh.
    pub fn needs_refresh_at(&self, state: &CatalogState, now: DateTime<Utc>) -> bool {
        let Some(last_update) = state.last_update else {
            return true;
        };
        match (now - last_update).to_std() {
            Ok(age) => age > self.refresh_interval,
            Err(_) => false,
        }
    }

    pub fn needs_refresh(&self, state: &CatalogState) -> bool {
        self.needs_refresh_at(state, Utc::now())
    }
}

/// Whether the catalog held by `store` is due for a refresh now
pub fn needs_refresh(store: &ObjectStore, policy: &StalenessPolicy) -> bool {
    policy.needs_refresh(&catalog_state(store))
}
