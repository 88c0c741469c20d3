use std::sync::Arc;

use super::user_agent::unknown;

/// Operating system part of a classification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingSystem {
    pub(crate) family: Arc<str>,
    pub(crate) name: Arc<str>,
    pub(crate) producer: Arc<str>,
    pub(crate) producer_url: Arc<str>,
    pub(crate) url: Arc<str>,
    pub(crate) icon: Arc<str>,
}

impl Default for OperatingSystem {
    fn default() -> Self {
        Self {
            family: unknown(),
            name: unknown(),
            producer: unknown(),
            producer_url: unknown(),
            url: unknown(),
            icon: unknown(),
        }
    }
}

impl OperatingSystem {
    pub fn family(&self) -> &str {
        &self.family
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn producer(&self) -> &str {
        &self.producer
    }
    pub fn producer_url(&self) -> &str {
        &self.producer_url
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// True while no catalog entry has determined the operating system.
    pub fn is_unknown(&self) -> bool {
        *self == Self::default()
    }
}
