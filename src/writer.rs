//! Dataset serialization. The output keeps list order and the stored hashes,
//! so reading it back yields an identical dataset.

use crate::catalog::Dataset;
use crate::db::*;
use crate::error::Result;

pub fn to_document(dataset: &Dataset) -> CatalogDocument {
    CatalogDocument {
        version: dataset.version().to_string(),
        browser_types: dataset.browser_types().values().map(|t| t.to_entry()).collect(),
        operating_systems: dataset.operating_systems().values().map(|os| os.to_entry()).collect(),
        operating_system_patterns: dataset
            .os_patterns()
            .iter()
            .map(|(p, os)| OsPatternEntry {
                pattern: p.fields().clone(),
                operating_system_id: os.id,
                hash: p.hash().to_string(),
            })
            .collect(),
        browsers: dataset.browsers().values().map(|b| b.to_entry()).collect(),
        browser_patterns: dataset
            .browser_patterns()
            .iter()
            .map(|(p, b)| BrowserPatternEntry {
                pattern: p.fields().clone(),
                browser_id: b.id,
                hash: p.hash().to_string(),
            })
            .collect(),
        devices: dataset.devices().values().map(|d| d.to_entry()).collect(),
        device_patterns: dataset
            .device_patterns()
            .iter()
            .map(|(p, d)| DevicePatternEntry {
                pattern: p.fields().clone(),
                device_id: d.id,
                hash: p.hash().to_string(),
            })
            .collect(),
        robots: dataset.robots().values().map(|r| r.to_entry()).collect(),
    }
}

pub fn to_json(dataset: &Dataset) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_document(dataset))?)
}

pub fn to_yaml(dataset: &Dataset) -> Result<String> {
    Ok(serde_yaml::to_string(&to_document(dataset))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{sample_dataset, sample_document};

    #[test]
    fn document_matches_source() {
        let ds = sample_dataset("2024.01");
        assert_eq!(to_document(&ds), sample_document("2024.01"));
    }

    #[test]
    fn json_round_trip_keeps_order_and_hashes() {
        let ds = sample_dataset("2024.01");
        let json = to_json(&ds).unwrap();
        let doc: CatalogDocument = serde_json::from_str(&json).unwrap();
        let again = Dataset::from_document(doc, true, &mut Vec::new()).unwrap();
        assert_eq!(to_document(&again), to_document(&ds));
    }

    #[test]
    fn yaml_uses_kebab_case() {
        let yaml = to_yaml(&sample_dataset("1")).unwrap();
        assert!(yaml.contains("browser-patterns:"));
        assert!(yaml.contains("user-agent-string:"));
    }
}
