use fixtures::fixtures;
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use uadetector::db::CatalogDocument;
use uadetector::{
    checksum, writer, CatalogReader, Classifier, Dataset, DocumentReader, UserAgentStringParser,
    UNKNOWN,
};

const CATALOG: &str = "tests/fixtures/catalog.yml";

fn sealed_document() -> CatalogDocument {
    let content = std::fs::read_to_string(CATALOG).unwrap();
    let mut doc: CatalogDocument = serde_yaml::from_str(&content).unwrap();
    checksum::seal(&mut doc);
    doc
}

// Shared classifier, built once from the authoring catalog.
static CLASSIFIER: OnceLock<Arc<Classifier>> = OnceLock::new();

fn classifier() -> Arc<Classifier> {
    CLASSIFIER
        .get_or_init(|| {
            let t = std::time::Instant::now();
            let dataset = Dataset::from_document(sealed_document(), true, &mut Vec::new())
                .expect("fixture catalog is valid");
            eprintln!("catalog loaded in {:?}", t.elapsed());
            Arc::new(Classifier::fixed(dataset).unwrap())
        })
        .clone()
}

// ---------------------------------------------------------------------------
// Classification fixtures
// ---------------------------------------------------------------------------

fn unknown() -> String {
    UNKNOWN.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Case {
    user_agent: String,
    #[serde(default = "unknown")]
    family: String,
    #[serde(default = "unknown")]
    name: String,
    #[serde(default = "unknown", rename = "type")]
    kind: String,
    #[serde(default)]
    version: String,
    #[serde(default = "unknown")]
    os_family: String,
    #[serde(default = "unknown")]
    os_name: String,
    #[serde(default = "unknown")]
    device: String,
    #[serde(default)]
    robot: bool,
}

#[fixtures([
    "tests/fixtures/browsers.yml",
    "tests/fixtures/mobile.yml",
    "tests/fixtures/robots.yml",
    "tests/fixtures/unknown.yml",
])]
#[test]
fn test_classification_fixtures(path: &Path) {
    let c = classifier();
    let content = std::fs::read_to_string(path).unwrap();
    let cases: Vec<Case> = serde_yaml::from_str(&content).unwrap();
    assert!(!cases.is_empty());

    for case in &cases {
        let ua = c.parse(&case.user_agent);
        let ctx = &case.user_agent;
        assert_eq!(ua.family(), case.family, "family for UA: {}", ctx);
        assert_eq!(ua.name(), case.name, "name for UA: {}", ctx);
        assert_eq!(ua.type_name(), case.kind, "type for UA: {}", ctx);
        assert_eq!(ua.version().to_string(), case.version, "version for UA: {}", ctx);
        assert_eq!(
            ua.operating_system().family(),
            case.os_family,
            "os family for UA: {}",
            ctx
        );
        assert_eq!(ua.operating_system().name(), case.os_name, "os name for UA: {}", ctx);
        assert_eq!(ua.device_category().as_str(), case.device, "device for UA: {}", ctx);
        assert_eq!(ua.is_robot(), case.robot, "robot flag for UA: {}", ctx);
    }
}

// ---------------------------------------------------------------------------
// Catalog format
// ---------------------------------------------------------------------------

#[test]
fn unsealed_catalog_is_rejected() {
    let content = std::fs::read(CATALOG).unwrap();
    let out = DocumentReader::yaml().read(&content, encoding_rs::UTF_8);
    assert!(out.dataset.is_empty());
    // every entity plus the rejection
    let doc: CatalogDocument = serde_yaml::from_slice(&content).unwrap();
    let entities = doc.browser_types.len()
        + doc.operating_systems.len()
        + doc.operating_system_patterns.len()
        + doc.browsers.len()
        + doc.browser_patterns.len()
        + doc.devices.len()
        + doc.device_patterns.len()
        + doc.robots.len();
    assert_eq!(out.warnings.len(), entities + 1);
}

#[test]
fn json_and_yaml_round_trip() {
    let original = classifier().dataset();

    let json = writer::to_json(&original).unwrap();
    let from_json = DocumentReader::json().read(json.as_bytes(), encoding_rs::UTF_8);
    assert!(from_json.warnings.is_empty(), "{:?}", from_json.warnings);

    let yaml = writer::to_yaml(&from_json.dataset).unwrap();
    let from_yaml = DocumentReader::yaml().read(yaml.as_bytes(), encoding_rs::UTF_8);
    assert!(from_yaml.warnings.is_empty(), "{:?}", from_yaml.warnings);

    let again = from_yaml.dataset;
    assert_eq!(writer::to_document(&again), writer::to_document(&original));
    assert_eq!(again.stats(), original.stats());

    let order = |ds: &Dataset| -> Vec<u32> {
        ds.browser_patterns().iter().map(|(p, _)| p.id()).collect()
    };
    assert_eq!(order(&again), order(&*original));
    let robots = |ds: &Dataset| -> Vec<String> {
        ds.robots().keys().map(|k| k.to_string()).collect()
    };
    assert_eq!(robots(&again), robots(&*original));
    assert!(again.verify_checksums().is_empty());
}

#[test]
fn windows_1252_catalog() {
    let mut doc = sealed_document();
    doc.browsers[0].producer = "Microsoft Corporation\u{00e9}".into();
    checksum::seal(&mut doc);
    let yaml = serde_yaml::to_string(&doc).unwrap();
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(&yaml);
    assert!(!unmappable);

    let out = DocumentReader::yaml().read(&bytes, encoding_rs::WINDOWS_1252);
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    assert_eq!(
        out.dataset.browsers()[&1].producer.as_ref(),
        "Microsoft Corporation\u{00e9}"
    );
}

#[test]
fn concurrent_parse_is_consistent() {
    let c = classifier();
    let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:102.0) Gecko/20100101 Firefox/102.0";
    let expected = c.parse(ua);
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..200 {
                    assert_eq!(c.parse(ua), expected);
                }
            });
        }
    });
}
