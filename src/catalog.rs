use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::checksum::{self, Checksum};
use crate::db::{self, CatalogDocument};
use crate::error::{Error, Result};
use crate::parser::PatternList;
use crate::parser_data::*;

/// Immutable, versioned pattern catalog.
///
/// Pattern lists keep the order they were supplied in; that order is the sole
/// match precedence. A published dataset is never mutated.
#[derive(Debug, Default)]
pub struct Dataset {
    version: String,
    browser_types: IndexMap<u32, Arc<BrowserTypeData>>,
    operating_systems: IndexMap<u32, Arc<OsData>>,
    browsers: IndexMap<u32, Arc<BrowserData>>,
    devices: IndexMap<u32, Arc<DeviceData>>,
    browser_patterns: PatternList<Arc<BrowserData>>,
    os_patterns: PatternList<Arc<OsData>>,
    device_patterns: PatternList<Arc<DeviceData>>,
    /// Keyed by the literal user-agent string.
    robots: IndexMap<Arc<str>, Arc<RobotData>>,
}

/// Entry counts, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetStats {
    pub browser_types: usize,
    pub browsers: usize,
    pub browser_patterns: usize,
    pub operating_systems: usize,
    pub os_patterns: usize,
    pub devices: usize,
    pub device_patterns: usize,
    pub robots: usize,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} browsers ({} patterns), {} operating systems ({} patterns), ",
            self.browsers,
            self.browser_patterns,
            self.operating_systems,
            self.os_patterns
        )?;
        write!(
            f,
            "{} devices ({} patterns), {} robots",
            self.devices, self.device_patterns, self.robots
        )
    }
}

impl Dataset {
    /// The reader's "nothing usable" sentinel. Never installed by a store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset from a parsed document.
    ///
    /// With `verify_checksums`, every entity's hash must match; all mismatches
    /// are pushed onto `warnings` before the document is rejected.
    pub fn from_document(
        doc: CatalogDocument,
        verify_checksums: bool,
        warnings: &mut Vec<String>,
    ) -> Result<Self> {
        if verify_checksums {
            let mismatches = checksum::verify_document(&doc);
            if !mismatches.is_empty() {
                let first = first_mismatch(&doc);
                warnings.extend(mismatches);
                return Err(first);
            }
        }

        let CatalogDocument {
            version,
            browser_types,
            operating_systems,
            operating_system_patterns,
            browsers,
            browser_patterns,
            devices,
            device_patterns,
            robots,
        } = doc;

        let browser_types = index_by_id(
            "browser type",
            browser_types.into_iter().map(|e| (e.id, BrowserTypeData::from(e))),
        )?;
        let operating_systems = index_by_id(
            "operating system",
            operating_systems.into_iter().map(|e| (e.id, OsData::from(e))),
        )?;
        let devices = index_by_id(
            "device",
            devices.into_iter().map(|e| (e.id, DeviceData::from(e))),
        )?;

        let mut browser_items = Vec::with_capacity(browsers.len());
        for e in browsers {
            let browser_type = lookup(
                &browser_types,
                "browser",
                e.id,
                "browser-type-id",
                e.browser_type_id,
            )?;
            let operating_system = match e.operating_system_id {
                Some(os_id) => Some(lookup(
                    &operating_systems,
                    "browser",
                    e.id,
                    "operating-system-id",
                    os_id,
                )?),
                None => None,
            };
            let data = BrowserData {
                id: e.id,
                family: e.family.into(),
                browser_type,
                operating_system,
                producer: e.producer.into(),
                producer_url: e.producer_url.into(),
                url: e.url.into(),
                icon: e.icon.into(),
                info_url: e.info_url.into(),
                hash: e.hash,
            };
            browser_items.push((data.id, data));
        }
        let browser_map = index_by_id("browser", browser_items)?;

        let browser_items = browser_patterns
            .into_iter()
            .map(|p| {
                let owner = lookup(
                    &browser_map,
                    "browser pattern",
                    p.pattern.id,
                    "browser-id",
                    p.browser_id,
                )?;
                Ok((p.pattern, p.hash, owner))
            })
            .collect::<Result<Vec<_>>>()?;
        let os_items = operating_system_patterns
            .into_iter()
            .map(|p| {
                let owner = lookup(
                    &operating_systems,
                    "operating system pattern",
                    p.pattern.id,
                    "operating-system-id",
                    p.operating_system_id,
                )?;
                Ok((p.pattern, p.hash, owner))
            })
            .collect::<Result<Vec<_>>>()?;
        let device_items = device_patterns
            .into_iter()
            .map(|p| {
                let owner = lookup(
                    &devices,
                    "device pattern",
                    p.pattern.id,
                    "device-id",
                    p.device_id,
                )?;
                Ok((p.pattern, p.hash, owner))
            })
            .collect::<Result<Vec<_>>>()?;

        let ((browser_patterns, os_patterns), device_patterns) = rayon::join(
            || {
                rayon::join(
                    || PatternList::build(browser_items),
                    || PatternList::build(os_items),
                )
            },
            || PatternList::build(device_items),
        );

        let mut robot_map: IndexMap<Arc<str>, Arc<RobotData>> = IndexMap::new();
        for e in robots {
            let data = RobotData::from(e);
            if robot_map.contains_key(&data.user_agent_string) {
                warnings.push(format!(
                    "robot {}: duplicate user-agent string '{}', first entry kept",
                    data.id, data.user_agent_string
                ));
                continue;
            }
            robot_map.insert(data.user_agent_string.clone(), Arc::new(data));
        }

        Ok(Self {
            version,
            browser_types,
            operating_systems,
            browsers: browser_map,
            devices,
            browser_patterns: browser_patterns?,
            os_patterns: os_patterns?,
            device_patterns: device_patterns?,
            robots: robot_map,
        })
    }

    /// Recompute every entity's hash from its fields. Returns one warning per
    /// mismatch; an empty vec means the dataset is intact.
    pub fn verify_checksums(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut check = |entity: &'static str, id: u32, stored: &str, actual: String| {
            if actual != stored {
                warnings.push(format!(
                    "{} {}: checksum mismatch (stored '{}', computed '{}')",
                    entity, id, stored, actual
                ));
            }
        };

        for t in self.browser_types.values() {
            check("browser type", t.id, &t.hash, t.to_entry().compute_hash());
        }
        for os in self.operating_systems.values() {
            check("operating system", os.id, &os.hash, os.to_entry().compute_hash());
        }
        for b in self.browsers.values() {
            check("browser", b.id, &b.hash, b.to_entry().compute_hash());
        }
        for d in self.devices.values() {
            check("device", d.id, &d.hash, d.to_entry().compute_hash());
        }
        for r in self.robots.values() {
            check("robot", r.id, &r.hash, r.to_entry().compute_hash());
        }
        for (p, owner) in self.browser_patterns.iter() {
            let entry = db::BrowserPatternEntry {
                pattern: p.fields().clone(),
                browser_id: owner.id,
                hash: p.hash().to_string(),
            };
            check("browser pattern", p.id(), p.hash(), entry.compute_hash());
        }
        for (p, owner) in self.os_patterns.iter() {
            let entry = db::OsPatternEntry {
                pattern: p.fields().clone(),
                operating_system_id: owner.id,
                hash: p.hash().to_string(),
            };
            check("operating system pattern", p.id(), p.hash(), entry.compute_hash());
        }
        for (p, owner) in self.device_patterns.iter() {
            let entry = db::DevicePatternEntry {
                pattern: p.fields().clone(),
                device_id: owner.id,
                hash: p.hash().to_string(),
            };
            check("device pattern", p.id(), p.hash(), entry.compute_hash());
        }
        warnings
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// No patterns and no robots: nothing could ever be classified.
    pub fn is_empty(&self) -> bool {
        self.browser_patterns.is_empty()
            && self.os_patterns.is_empty()
            && self.device_patterns.is_empty()
            && self.robots.is_empty()
    }

    pub fn browser_patterns(&self) -> &PatternList<Arc<BrowserData>> {
        &self.browser_patterns
    }

    pub fn os_patterns(&self) -> &PatternList<Arc<OsData>> {
        &self.os_patterns
    }

    pub fn device_patterns(&self) -> &PatternList<Arc<DeviceData>> {
        &self.device_patterns
    }

    pub fn robots(&self) -> &IndexMap<Arc<str>, Arc<RobotData>> {
        &self.robots
    }

    /// Exact-match robot lookup.
    pub fn robot(&self, user_agent: &str) -> Option<&Arc<RobotData>> {
        self.robots.get(user_agent)
    }

    pub fn browser_types(&self) -> &IndexMap<u32, Arc<BrowserTypeData>> {
        &self.browser_types
    }

    pub fn browsers(&self) -> &IndexMap<u32, Arc<BrowserData>> {
        &self.browsers
    }

    pub fn operating_systems(&self) -> &IndexMap<u32, Arc<OsData>> {
        &self.operating_systems
    }

    pub fn devices(&self) -> &IndexMap<u32, Arc<DeviceData>> {
        &self.devices
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            browser_types: self.browser_types.len(),
            browsers: self.browsers.len(),
            browser_patterns: self.browser_patterns.len(),
            operating_systems: self.operating_systems.len(),
            os_patterns: self.os_patterns.len(),
            devices: self.devices.len(),
            device_patterns: self.device_patterns.len(),
            robots: self.robots.len(),
        }
    }
}

/// Ids must be unique within each entity list.
fn index_by_id<T>(
    entity: &'static str,
    items: impl IntoIterator<Item = (u32, T)>,
) -> Result<IndexMap<u32, Arc<T>>> {
    let mut map = IndexMap::new();
    for (id, data) in items {
        if map.insert(id, Arc::new(data)).is_some() {
            return Err(Error::DuplicateId { entity, id });
        }
    }
    Ok(map)
}

fn lookup<T>(
    table: &IndexMap<u32, Arc<T>>,
    entity: &'static str,
    id: u32,
    field: &'static str,
    target: u32,
) -> Result<Arc<T>> {
    table.get(&target).cloned().ok_or(Error::UnknownReference {
        entity,
        id,
        field,
        target,
    })
}

fn mismatch_error<T: Checksum>(entries: &[T]) -> Option<Error> {
    entries.iter().find_map(|e| {
        e.verify().map(|actual| Error::Checksum {
            entity: T::ENTITY,
            id: e.id(),
            expected: e.stored_hash().to_string(),
            actual,
        })
    })
}

fn first_mismatch(doc: &CatalogDocument) -> Error {
    mismatch_error(&doc.browser_types)
        .or_else(|| mismatch_error(&doc.operating_systems))
        .or_else(|| mismatch_error(&doc.operating_system_patterns))
        .or_else(|| mismatch_error(&doc.browsers))
        .or_else(|| mismatch_error(&doc.browser_patterns))
        .or_else(|| mismatch_error(&doc.devices))
        .or_else(|| mismatch_error(&doc.device_patterns))
        .or_else(|| mismatch_error(&doc.robots))
        .unwrap_or(Error::EmptyCatalog)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::*;

    fn fields(id: u32, position: u32, regex: &str) -> PatternFields {
        PatternFields {
            id,
            position,
            regex: regex.into(),
            ..Default::default()
        }
    }

    /// Small sealed catalog shared by the crate's unit tests.
    pub(crate) fn sample_document(version: &str) -> CatalogDocument {
        let mut doc = CatalogDocument {
            version: version.into(),
            browser_types: vec![
                BrowserTypeEntry { id: 1, name: "Browser".into(), ..Default::default() },
                BrowserTypeEntry { id: 2, name: "Mobile Browser".into(), ..Default::default() },
            ],
            operating_systems: vec![
                OsEntry {
                    id: 1,
                    family: "Windows".into(),
                    name: "Windows 10".into(),
                    producer: "Microsoft Corporation.".into(),
                    ..Default::default()
                },
                OsEntry {
                    id: 2,
                    family: "iOS".into(),
                    name: "iOS".into(),
                    producer: "Apple Inc.".into(),
                    ..Default::default()
                },
                OsEntry {
                    id: 3,
                    family: "Linux".into(),
                    name: "Linux".into(),
                    ..Default::default()
                },
            ],
            operating_system_patterns: vec![
                OsPatternEntry {
                    pattern: fields(1, 1, "Windows NT 10\\.0"),
                    operating_system_id: 1,
                    hash: String::new(),
                },
                OsPatternEntry {
                    pattern: PatternFields {
                        flags: "i".into(),
                        ..fields(2, 2, "Linux")
                    },
                    operating_system_id: 3,
                    hash: String::new(),
                },
            ],
            browsers: vec![
                BrowserEntry {
                    id: 1,
                    family: "Firefox".into(),
                    browser_type_id: 1,
                    producer: "Mozilla Foundation".into(),
                    ..Default::default()
                },
                BrowserEntry {
                    id: 2,
                    family: "Mobile Safari".into(),
                    browser_type_id: 2,
                    operating_system_id: Some(2),
                    producer: "Apple Inc.".into(),
                    ..Default::default()
                },
                BrowserEntry {
                    id: 3,
                    family: "Mozilla".into(),
                    browser_type_id: 1,
                    ..Default::default()
                },
            ],
            browser_patterns: vec![
                BrowserPatternEntry {
                    pattern: fields(10, 1, "Firefox/([\\d.]+)"),
                    browser_id: 1,
                    hash: String::new(),
                },
                BrowserPatternEntry {
                    pattern: fields(11, 2, "Version/([\\d.]+) Mobile/\\w+ Safari"),
                    browser_id: 2,
                    hash: String::new(),
                },
                BrowserPatternEntry {
                    pattern: fields(12, 3, "Mozilla"),
                    browser_id: 3,
                    hash: String::new(),
                },
            ],
            devices: vec![DeviceEntry {
                id: 1,
                name: "Smartphone".into(),
                ..Default::default()
            }],
            device_patterns: vec![DevicePatternEntry {
                pattern: fields(1, 1, "iPhone|Android.+Mobile"),
                device_id: 1,
                hash: String::new(),
            }],
            robots: vec![RobotEntry {
                id: 1,
                user_agent_string: "Googlebot/2.1 (+http://www.google.com/bot.html)".into(),
                name: "Googlebot/2.1".into(),
                family: "Googlebot".into(),
                producer: "Google Inc.".into(),
                ..Default::default()
            }],
        };
        checksum::seal(&mut doc);
        doc
    }

    pub(crate) fn sample_dataset(version: &str) -> Dataset {
        Dataset::from_document(sample_document(version), true, &mut Vec::new()).unwrap()
    }

    #[test]
    fn order_is_preserved() {
        let ds = sample_dataset("1");
        let ids: Vec<u32> = ds.browser_patterns().iter().map(|(p, _)| p.id()).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn position_does_not_reorder() {
        let mut doc = sample_document("1");
        doc.browser_patterns[0].pattern.position = 99;
        checksum::seal(&mut doc);
        let ds = Dataset::from_document(doc, true, &mut Vec::new()).unwrap();
        assert_eq!(ds.browser_patterns().iter().next().unwrap().0.id(), 10);
    }

    #[test]
    fn tampered_entity_rejects_whole_document() {
        let mut doc = sample_document("1");
        doc.browsers[0].family = "Iceweasel".into();
        let mut warnings = Vec::new();
        let err = Dataset::from_document(doc, true, &mut warnings).unwrap_err();
        assert!(matches!(err, Error::Checksum { entity: "browser", id: 1, .. }));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unverified_build_then_verify_reports() {
        let mut doc = sample_document("1");
        doc.robots[0].producer = "Evil Corp".into();
        let ds = Dataset::from_document(doc, false, &mut Vec::new()).unwrap();
        let warnings = ds.verify_checksums();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("robot 1"));
    }

    #[test]
    fn intact_dataset_verifies() {
        assert!(sample_dataset("1").verify_checksums().is_empty());
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let mut doc = sample_document("1");
        doc.browser_patterns[1].browser_id = 42;
        checksum::seal(&mut doc);
        let err = Dataset::from_document(doc, true, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownReference { field: "browser-id", target: 42, .. }
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut doc = sample_document("1");
        let mut twin = doc.operating_systems[0].clone();
        twin.name = "Windows 11".into();
        doc.operating_systems.push(twin);
        checksum::seal(&mut doc);
        let err = Dataset::from_document(doc, true, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateId {
                entity: "operating system",
                id: 1
            }
        ));

        let mut doc = sample_document("1");
        let twin = doc.browsers[0].clone();
        doc.browsers.push(twin);
        checksum::seal(&mut doc);
        let err = Dataset::from_document(doc, true, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { entity: "browser", .. }));
    }

    #[test]
    fn empty_sentinel() {
        assert!(Dataset::empty().is_empty());
        assert!(!sample_dataset("1").is_empty());
        assert_eq!(sample_dataset("1").stats().robots, 1);
    }
}
