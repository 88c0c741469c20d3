use std::sync::{Arc, OnceLock};

use super::{DeviceCategory, OperatingSystem, UserAgentType, VersionNumber};

/// Sentinel for every string field no catalog entry has determined.
pub const UNKNOWN: &str = "unknown";

pub(crate) fn unknown() -> Arc<str> {
    static UNKNOWN_ARC: OnceLock<Arc<str>> = OnceLock::new();
    UNKNOWN_ARC.get_or_init(|| Arc::from(UNKNOWN)).clone()
}

/// Classification result. Immutable once returned; strings are shared with
/// the dataset they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent {
    family: Arc<str>,
    name: Arc<str>,
    type_name: Arc<str>,
    kind: UserAgentType,
    producer: Arc<str>,
    producer_url: Arc<str>,
    url: Arc<str>,
    icon: Arc<str>,
    version: VersionNumber,
    operating_system: OperatingSystem,
    device_category: DeviceCategory,
}

impl UserAgent {
    /// The result for a string nothing in the catalog matched.
    pub fn unknown() -> Self {
        UserAgentBuilder::default().build()
    }

    pub fn family(&self) -> &str {
        &self.family
    }
    /// Family plus the captured version, e.g. `Firefox 102.0`.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The catalog's browser-type name, e.g. `Mobile Browser`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
    pub fn kind(&self) -> UserAgentType {
        self.kind
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
    pub fn version(&self) -> &VersionNumber {
        &self.version
    }
    pub fn operating_system(&self) -> &OperatingSystem {
        &self.operating_system
    }
    pub fn device_category(&self) -> DeviceCategory {
        self.device_category
    }
    pub fn is_robot(&self) -> bool {
        self.kind == UserAgentType::Robot
    }
}

/// Accumulator local to one classification; never shared.
#[derive(Debug)]
pub(crate) struct UserAgentBuilder {
    pub family: Arc<str>,
    pub name: Arc<str>,
    pub type_name: Arc<str>,
    pub kind: UserAgentType,
    pub producer: Arc<str>,
    pub producer_url: Arc<str>,
    pub url: Arc<str>,
    pub icon: Arc<str>,
    pub version: VersionNumber,
    pub operating_system: OperatingSystem,
    pub device_category: DeviceCategory,
}

impl Default for UserAgentBuilder {
    fn default() -> Self {
        Self {
            family: unknown(),
            name: unknown(),
            type_name: unknown(),
            kind: UserAgentType::Unknown,
            producer: unknown(),
            producer_url: unknown(),
            url: unknown(),
            icon: unknown(),
            version: VersionNumber::unknown(),
            operating_system: OperatingSystem::default(),
            device_category: DeviceCategory::Unknown,
        }
    }
}

impl UserAgentBuilder {
    pub fn build(self) -> UserAgent {
        UserAgent {
            family: self.family,
            name: self.name,
            type_name: self.type_name,
            kind: self.kind,
            producer: self.producer,
            producer_url: self.producer_url,
            url: self.url,
            icon: self.icon,
            version: self.version,
            operating_system: self.operating_system,
            device_category: self.device_category,
        }
    }
}
