use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Catalog document
//
// One JSON or YAML document holds the whole catalog. Entities reference each
// other by id; every entity carries its own `hash` (see `checksum.rs`).
// Array order of the pattern lists is the match priority.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogDocument {
    pub version: String,
    #[serde(default)]
    pub browser_types: Vec<BrowserTypeEntry>,
    #[serde(default)]
    pub operating_systems: Vec<OsEntry>,
    #[serde(default)]
    pub operating_system_patterns: Vec<OsPatternEntry>,
    #[serde(default)]
    pub browsers: Vec<BrowserEntry>,
    #[serde(default)]
    pub browser_patterns: Vec<BrowserPatternEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<DeviceEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_patterns: Vec<DevicePatternEntry>,
    #[serde(default)]
    pub robots: Vec<RobotEntry>,
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BrowserTypeEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OsEntry {
    pub id: u32,
    pub family: String,
    pub name: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub producer_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub info_url: String,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BrowserEntry {
    pub id: u32,
    pub family: String,
    pub browser_type_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system_id: Option<u32>,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub producer_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub info_url: String,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub info_url: String,
    #[serde(default)]
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Robots
//
// Matched by exact user-agent string equality, never by pattern.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RobotEntry {
    pub id: u32,
    pub user_agent_string: String,
    pub name: String,
    pub family: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub producer_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub info_url: String,
    #[serde(default)]
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Patterns
//
// `position` is the curator's ordinal. It round-trips but the match order is
// the array order.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternFields {
    pub id: u32,
    pub position: u32,
    pub regex: String,
    #[serde(default)]
    pub flags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_group: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BrowserPatternEntry {
    #[serde(flatten)]
    pub pattern: PatternFields,
    pub browser_id: u32,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OsPatternEntry {
    #[serde(flatten)]
    pub pattern: PatternFields,
    pub operating_system_id: u32,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DevicePatternEntry {
    #[serde(flatten)]
    pub pattern: PatternFields,
    pub device_id: u32,
    #[serde(default)]
    pub hash: String,
}
