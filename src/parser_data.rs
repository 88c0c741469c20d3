use std::sync::Arc;

use crate::db;
use crate::types::{UserAgentBuilder, UserAgentType};

// ---------------------------------------------------------------------------
// Catalog entities carried inside a Dataset
//
// Strings are `Arc<str>` so a classification result can share them with the
// dataset instead of copying.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserTypeData {
    pub id: u32,
    pub name: Arc<str>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsData {
    pub id: u32,
    pub family: Arc<str>,
    pub name: Arc<str>,
    pub producer: Arc<str>,
    pub producer_url: Arc<str>,
    pub url: Arc<str>,
    pub icon: Arc<str>,
    pub info_url: Arc<str>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserData {
    pub id: u32,
    pub family: Arc<str>,
    pub browser_type: Arc<BrowserTypeData>,
    pub operating_system: Option<Arc<OsData>>,
    pub producer: Arc<str>,
    pub producer_url: Arc<str>,
    pub url: Arc<str>,
    pub icon: Arc<str>,
    pub info_url: Arc<str>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceData {
    pub id: u32,
    pub name: Arc<str>,
    pub icon: Arc<str>,
    pub info_url: Arc<str>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotData {
    pub id: u32,
    pub user_agent_string: Arc<str>,
    pub name: Arc<str>,
    pub family: Arc<str>,
    pub producer: Arc<str>,
    pub producer_url: Arc<str>,
    pub url: Arc<str>,
    pub icon: Arc<str>,
    pub info_url: Arc<str>,
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Raw entry → entity
// ---------------------------------------------------------------------------

impl From<db::BrowserTypeEntry> for BrowserTypeData {
    fn from(e: db::BrowserTypeEntry) -> Self {
        Self {
            id: e.id,
            name: e.name.into(),
            hash: e.hash,
        }
    }
}

impl From<db::OsEntry> for OsData {
    fn from(e: db::OsEntry) -> Self {
        Self {
            id: e.id,
            family: e.family.into(),
            name: e.name.into(),
            producer: e.producer.into(),
            producer_url: e.producer_url.into(),
            url: e.url.into(),
            icon: e.icon.into(),
            info_url: e.info_url.into(),
            hash: e.hash,
        }
    }
}

impl From<db::DeviceEntry> for DeviceData {
    fn from(e: db::DeviceEntry) -> Self {
        Self {
            id: e.id,
            name: e.name.into(),
            icon: e.icon.into(),
            info_url: e.info_url.into(),
            hash: e.hash,
        }
    }
}

impl From<db::RobotEntry> for RobotData {
    fn from(e: db::RobotEntry) -> Self {
        Self {
            id: e.id,
            user_agent_string: e.user_agent_string.into(),
            name: e.name.into(),
            family: e.family.into(),
            producer: e.producer.into(),
            producer_url: e.producer_url.into(),
            url: e.url.into(),
            icon: e.icon.into(),
            info_url: e.info_url.into(),
            hash: e.hash,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity → raw entry (writer and verification)
// ---------------------------------------------------------------------------

impl BrowserTypeData {
    pub fn to_entry(&self) -> db::BrowserTypeEntry {
        db::BrowserTypeEntry {
            id: self.id,
            name: self.name.to_string(),
            hash: self.hash.clone(),
        }
    }
}

impl OsData {
    pub fn to_entry(&self) -> db::OsEntry {
        db::OsEntry {
            id: self.id,
            family: self.family.to_string(),
            name: self.name.to_string(),
            producer: self.producer.to_string(),
            producer_url: self.producer_url.to_string(),
            url: self.url.to_string(),
            icon: self.icon.to_string(),
            info_url: self.info_url.to_string(),
            hash: self.hash.clone(),
        }
    }
}

impl BrowserData {
    pub fn to_entry(&self) -> db::BrowserEntry {
        db::BrowserEntry {
            id: self.id,
            family: self.family.to_string(),
            browser_type_id: self.browser_type.id,
            operating_system_id: self.operating_system.as_ref().map(|os| os.id),
            producer: self.producer.to_string(),
            producer_url: self.producer_url.to_string(),
            url: self.url.to_string(),
            icon: self.icon.to_string(),
            info_url: self.info_url.to_string(),
            hash: self.hash.clone(),
        }
    }
}

impl DeviceData {
    pub fn to_entry(&self) -> db::DeviceEntry {
        db::DeviceEntry {
            id: self.id,
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            info_url: self.info_url.to_string(),
            hash: self.hash.clone(),
        }
    }
}

impl RobotData {
    pub fn to_entry(&self) -> db::RobotEntry {
        db::RobotEntry {
            id: self.id,
            user_agent_string: self.user_agent_string.to_string(),
            name: self.name.to_string(),
            family: self.family.to_string(),
            producer: self.producer.to_string(),
            producer_url: self.producer_url.to_string(),
            url: self.url.to_string(),
            icon: self.icon.to_string(),
            info_url: self.info_url.to_string(),
            hash: self.hash.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Metadata onto a result
// ---------------------------------------------------------------------------

/// An entity that knows which result fields it determines.
pub(crate) trait ApplyTo {
    fn apply_to(&self, builder: &mut UserAgentBuilder);
}

impl ApplyTo for OsData {
    fn apply_to(&self, builder: &mut UserAgentBuilder) {
        builder.operating_system = crate::types::OperatingSystem {
            family: self.family.clone(),
            name: self.name.clone(),
            producer: self.producer.clone(),
            producer_url: self.producer_url.clone(),
            url: self.url.clone(),
            icon: self.icon.clone(),
        };
    }
}

impl ApplyTo for BrowserData {
    fn apply_to(&self, builder: &mut UserAgentBuilder) {
        builder.family = self.family.clone();
        builder.name = self.family.clone();
        builder.type_name = self.browser_type.name.clone();
        builder.kind = UserAgentType::from_type_name(&self.browser_type.name);
        builder.producer = self.producer.clone();
        builder.producer_url = self.producer_url.clone();
        builder.url = self.url.clone();
        builder.icon = self.icon.clone();
        if let Some(os) = &self.operating_system {
            os.apply_to(builder);
        }
    }
}

impl ApplyTo for RobotData {
    fn apply_to(&self, builder: &mut UserAgentBuilder) {
        builder.family = self.family.clone();
        builder.name = self.name.clone();
        builder.type_name = UserAgentType::Robot.as_str().into();
        builder.kind = UserAgentType::Robot;
        builder.producer = self.producer.clone();
        builder.producer_url = self.producer_url.clone();
        builder.url = self.url.clone();
        builder.icon = self.icon.clone();
    }
}
