use std::sync::Arc;

use crate::catalog::Dataset;
use crate::config::RefreshConfig;
use crate::detector::classify;
use crate::error::{Error, Result};
use crate::refresher::Refresher;
use crate::source::Locator;
use crate::store::CatalogStore;
use crate::types::UserAgent;

/// Anything that turns user-agent strings into [`UserAgent`]s.
pub trait UserAgentStringParser: Send + Sync {
    /// Version of the catalog currently in use.
    fn data_version(&self) -> String;

    /// Never fails; unmatched input gives unknown fields.
    fn parse(&self, user_agent: &str) -> UserAgent;

    /// Stop background work. Idempotent; `parse` keeps working on the last
    /// dataset afterwards.
    fn shutdown(&self);
}

enum Backing {
    Fixed(Arc<Dataset>),
    Updating {
        store: Arc<CatalogStore>,
        refresher: Refresher,
    },
}

/// Binds a dataset, or a self-updating [`CatalogStore`], to the classification
/// engine.
pub struct Classifier {
    backing: Backing,
}

impl Classifier {
    /// Classify against one dataset forever.
    pub fn fixed(dataset: Dataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(Error::invalid_argument("dataset must not be empty"));
        }
        Ok(Self {
            backing: Backing::Fixed(Arc::new(dataset)),
        })
    }

    /// Classify against whatever `store` currently holds, refreshing it in the
    /// background according to its update mode.
    pub fn updating(store: Arc<CatalogStore>) -> Result<Self> {
        let refresher = Refresher::spawn(store.clone())?;
        Ok(Self {
            backing: Backing::Updating { store, refresher },
        })
    }

    /// Build an HTTP-backed store from URLs and start updating it.
    pub fn online(
        catalog_url: &str,
        version_url: &str,
        fallback: Dataset,
        config: RefreshConfig,
    ) -> Result<Self> {
        let catalog = Locator::parse(catalog_url)?;
        let version = Locator::parse(version_url)?;
        let store = CatalogStore::builder(catalog, version)
            .fallback(fallback)
            .config(config)
            .build()?;
        Self::updating(Arc::new(store))
    }

    pub fn store(&self) -> Option<&Arc<CatalogStore>> {
        match &self.backing {
            Backing::Fixed(_) => None,
            Backing::Updating { store, .. } => Some(store),
        }
    }

    /// Ask the background refresher for an immediate cycle.
    pub fn request_refresh(&self) -> bool {
        match &self.backing {
            Backing::Fixed(_) => false,
            Backing::Updating { refresher, .. } => refresher.trigger(),
        }
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        match &self.backing {
            Backing::Fixed(dataset) => dataset.clone(),
            Backing::Updating { store, .. } => store.current_dataset(),
        }
    }
}

impl UserAgentStringParser for Classifier {
    fn data_version(&self) -> String {
        self.dataset().version().to_string()
    }

    fn parse(&self, user_agent: &str) -> UserAgent {
        classify(user_agent, &self.dataset())
    }

    fn shutdown(&self) {
        if let Backing::Updating { refresher, .. } = &self.backing {
            refresher.shutdown();
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backing {
            Backing::Fixed(dataset) => f
                .debug_struct("Classifier")
                .field("version", &dataset.version())
                .finish(),
            Backing::Updating { store, refresher } => f
                .debug_struct("Classifier")
                .field("store", store)
                .field("refresher", refresher)
                .finish(),
        }
    }
}
