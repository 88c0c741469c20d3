//! Per-entity integrity digests.
//!
//! `hash = hex(SHA-256(len(f1) f1 len(f2) f2 ... len(fn) fn))` over the
//! entity's fields in declaration order, `hash` itself excluded. Each `len` is
//! the field's byte length as a big-endian u64. Integers are written in
//! decimal, absent optionals as the empty string.

use sha2::{Digest, Sha256};

use super::db::*;

/// Digest `fields` in order, lowercase hex encoded.
pub fn digest<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn opt(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// An entity that carries a stored hash and can recompute it from its fields.
pub trait Checksum {
    const ENTITY: &'static str;

    fn id(&self) -> u32;
    fn stored_hash(&self) -> &str;
    fn compute_hash(&self) -> String;
    fn set_hash(&mut self, hash: String);

    /// Returns the recomputed hash when it differs from the stored one.
    fn verify(&self) -> Option<String> {
        let actual = self.compute_hash();
        (actual != self.stored_hash()).then_some(actual)
    }
}

impl Checksum for BrowserTypeEntry {
    const ENTITY: &'static str = "browser type";

    fn id(&self) -> u32 {
        self.id
    }
    fn stored_hash(&self) -> &str {
        &self.hash
    }
    fn compute_hash(&self) -> String {
        digest([self.id.to_string().as_str(), &self.name])
    }
    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

impl Checksum for OsEntry {
    const ENTITY: &'static str = "operating system";

    fn id(&self) -> u32 {
        self.id
    }
    fn stored_hash(&self) -> &str {
        &self.hash
    }
    fn compute_hash(&self) -> String {
        digest([
            self.id.to_string().as_str(),
            &self.family,
            &self.name,
            &self.producer,
            &self.producer_url,
            &self.url,
            &self.icon,
            &self.info_url,
        ])
    }
    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

impl Checksum for BrowserEntry {
    const ENTITY: &'static str = "browser";

    fn id(&self) -> u32 {
        self.id
    }
    fn stored_hash(&self) -> &str {
        &self.hash
    }
    fn compute_hash(&self) -> String {
        digest([
            self.id.to_string().as_str(),
            &self.family,
            &self.browser_type_id.to_string(),
            &opt(self.operating_system_id),
            &self.producer,
            &self.producer_url,
            &self.url,
            &self.icon,
            &self.info_url,
        ])
    }
    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

impl Checksum for DeviceEntry {
    const ENTITY: &'static str = "device";

    fn id(&self) -> u32 {
        self.id
    }
    fn stored_hash(&self) -> &str {
        &self.hash
    }
    fn compute_hash(&self) -> String {
        digest([
            self.id.to_string().as_str(),
            &self.name,
            &self.icon,
            &self.info_url,
        ])
    }
    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

impl Checksum for RobotEntry {
    const ENTITY: &'static str = "robot";

    fn id(&self) -> u32 {
        self.id
    }
    fn stored_hash(&self) -> &str {
        &self.hash
    }
    fn compute_hash(&self) -> String {
        digest([
            self.id.to_string().as_str(),
            &self.user_agent_string,
            &self.name,
            &self.family,
            &self.producer,
            &self.producer_url,
            &self.url,
            &self.icon,
            &self.info_url,
        ])
    }
    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

fn pattern_hash(p: &PatternFields, owner_id: u32) -> String {
    digest([
        p.id.to_string().as_str(),
        &p.position.to_string(),
        &p.regex,
        &p.flags,
        &opt(p.version_group),
        &owner_id.to_string(),
    ])
}

macro_rules! pattern_checksum {
    ($ty:ty, $entity:literal, $owner:ident) => {
        impl Checksum for $ty {
            const ENTITY: &'static str = $entity;

            fn id(&self) -> u32 {
                self.pattern.id
            }
            fn stored_hash(&self) -> &str {
                &self.hash
            }
            fn compute_hash(&self) -> String {
                pattern_hash(&self.pattern, self.$owner)
            }
            fn set_hash(&mut self, hash: String) {
                self.hash = hash;
            }
        }
    };
}

pattern_checksum!(BrowserPatternEntry, "browser pattern", browser_id);
pattern_checksum!(OsPatternEntry, "operating system pattern", operating_system_id);
pattern_checksum!(DevicePatternEntry, "device pattern", device_id);

fn seal_all<T: Checksum>(entries: &mut [T]) {
    for entry in entries {
        let hash = entry.compute_hash();
        entry.set_hash(hash);
    }
}

/// Recompute and store the hash of every entity in `doc`.
pub fn seal(doc: &mut CatalogDocument) {
    seal_all(&mut doc.browser_types);
    seal_all(&mut doc.operating_systems);
    seal_all(&mut doc.operating_system_patterns);
    seal_all(&mut doc.browsers);
    seal_all(&mut doc.browser_patterns);
    seal_all(&mut doc.devices);
    seal_all(&mut doc.device_patterns);
    seal_all(&mut doc.robots);
}

fn collect<T: Checksum>(entries: &[T], warnings: &mut Vec<String>) {
    for entry in entries {
        if let Some(actual) = entry.verify() {
            warnings.push(format!(
                "{} {}: checksum mismatch (stored '{}', computed '{}')",
                T::ENTITY,
                entry.id(),
                entry.stored_hash(),
                actual
            ));
        }
    }
}

/// Verify every entity of `doc`. Returns one warning per mismatching entity.
pub fn verify_document(doc: &CatalogDocument) -> Vec<String> {
    let mut warnings = Vec::new();
    collect(&doc.browser_types, &mut warnings);
    collect(&doc.operating_systems, &mut warnings);
    collect(&doc.operating_system_patterns, &mut warnings);
    collect(&doc.browsers, &mut warnings);
    collect(&doc.browser_patterns, &mut warnings);
    collect(&doc.devices, &mut warnings);
    collect(&doc.device_patterns, &mut warnings);
    collect(&doc.robots, &mut warnings);
    warnings
}
