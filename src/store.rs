use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwap;
use encoding_rs::{Encoding, UTF_8};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::Dataset;
use crate::config::RefreshConfig;
use crate::error::{Error, Result};
use crate::helpers::natural_cmp;
use crate::reader::{decode, CatalogReader, DocumentReader, ReadOutcome};
use crate::source::{DefaultFetcher, Fetcher, Locator};

// ---------------------------------------------------------------------------
// Version comparison
// ---------------------------------------------------------------------------

type CompareFn = dyn Fn(&str, &str) -> bool + Send + Sync;

/// Decides from `(current, remote)` version tokens whether to fetch the full
/// catalog.
#[derive(Clone)]
pub struct VersionComparator(Arc<CompareFn>);

impl VersionComparator {
    /// Any difference triggers a fetch.
    pub fn inequality() -> Self {
        Self(Arc::new(|current, remote| current != remote))
    }

    /// Fetch only when the remote token sorts after the current one in natural
    /// order (digit runs compared numerically).
    pub fn newer() -> Self {
        Self(Arc::new(|current, remote| {
            natural_cmp(remote, current) == CmpOrdering::Greater
        }))
    }

    pub fn custom(f: impl Fn(&str, &str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn should_update(&self, current: &str, remote: &str) -> bool {
        (self.0)(current, remote)
    }
}

impl Default for VersionComparator {
    fn default() -> Self {
        Self::inequality()
    }
}

impl fmt::Debug for VersionComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VersionComparator")
    }
}

// ---------------------------------------------------------------------------
// Refresh outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    VersionCheck,
    Fetch,
    Read,
    Validate,
    Cache,
}

impl RefreshStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VersionCheck => "version-check",
            Self::Fetch => "fetch",
            Self::Read => "read",
            Self::Validate => "validate",
            Self::Cache => "cache",
        }
    }
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub stage: RefreshStage,
    pub reason: String,
    pub warnings: Vec<String>,
}

impl RefreshFailure {
    fn new(stage: RefreshStage, reason: impl ToString) -> Self {
        Self {
            stage,
            reason: reason.to_string(),
            warnings: Vec::new(),
        }
    }
}

/// Result of one refresh cycle. A failure leaves the active dataset untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { previous: String, current: String },
    Unchanged { version: String },
    /// Another cycle was in flight; this trigger was dropped.
    AlreadyRunning,
    Failed(RefreshFailure),
}

impl RefreshOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

/// Holds the active [`Dataset`] and runs the refresh protocol.
///
/// Readers load the current snapshot without locking; a refresh publishes a
/// complete new dataset with a single atomic swap. At most one refresh runs at
/// a time.
pub struct CatalogStore {
    active: ArcSwap<Dataset>,
    catalog: Locator,
    version: Locator,
    fetcher: Arc<dyn Fetcher>,
    reader: Arc<dyn CatalogReader>,
    encoding: &'static Encoding,
    comparator: VersionComparator,
    cache_file: Option<PathBuf>,
    config: RefreshConfig,
    refreshing: AtomicBool,
    /// Set when no cached catalog could be loaded; the next cycle fetches
    /// regardless of the version comparison.
    force_fetch: AtomicBool,
    last_warnings: Mutex<Vec<String>>,
    last_update_check: Mutex<Option<SystemTime>>,
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("catalog", &self.catalog)
            .field("version", &self.version)
            .field("active_version", &self.current_version())
            .field("cache_file", &self.cache_file)
            .field("config", &self.config)
            .finish()
    }
}

impl CatalogStore {
    pub fn builder(catalog: Locator, version: Locator) -> CatalogStoreBuilder {
        CatalogStoreBuilder::new(catalog, version)
    }

    /// The active snapshot. Never blocks and never fails.
    pub fn current_dataset(&self) -> Arc<Dataset> {
        self.active.load_full()
    }

    pub fn current_version(&self) -> String {
        self.active.load().version().to_string()
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn catalog_locator(&self) -> &Locator {
        &self.catalog
    }

    pub fn version_locator(&self) -> &Locator {
        &self.version
    }

    /// Warnings of the most recent cycle that got as far as reading.
    pub fn last_warnings(&self) -> Vec<String> {
        self.last_warnings.lock().clone()
    }

    pub fn last_update_check(&self) -> Option<SystemTime> {
        *self.last_update_check.lock()
    }

    /// Run one refresh cycle: version check, conditional fetch, validation,
    /// atomic publish. Returns `AlreadyRunning` if a cycle is in flight.
    pub fn refresh(&self) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight");
            return RefreshOutcome::AlreadyRunning;
        }
        let _running = RunningGuard(&self.refreshing);

        let outcome = self.run_cycle();
        *self.last_update_check.lock() = Some(SystemTime::now());
        if let RefreshOutcome::Failed(failure) = &outcome {
            let locator = match failure.stage {
                RefreshStage::VersionCheck => &self.version,
                _ => &self.catalog,
            };
            warn!(
                locator = %locator,
                stage = %failure.stage,
                reason = %failure.reason,
                warnings = ?failure.warnings,
                "catalog refresh failed, keeping version {}",
                self.current_version()
            );
        }
        outcome
    }

    fn run_cycle(&self) -> RefreshOutcome {
        let remote = match self.fetch_version() {
            Ok(v) => v,
            Err(failure) => return RefreshOutcome::Failed(failure),
        };
        let current = self.current_version();
        let forced = self.force_fetch.load(Ordering::Acquire);
        debug!(version = %current, remote_version = %remote, forced, "version check");
        if !forced && !self.comparator.should_update(&current, &remote) {
            return RefreshOutcome::Unchanged { version: current };
        }

        let bytes = match self.fetcher.fetch(&self.catalog) {
            Ok(b) => b,
            Err(err) => {
                return RefreshOutcome::Failed(RefreshFailure::new(RefreshStage::Fetch, err))
            }
        };

        let candidate = match self.validate(&bytes) {
            Ok(c) => c,
            Err(failure) => {
                *self.last_warnings.lock() = failure.warnings.clone();
                return RefreshOutcome::Failed(failure);
            }
        };
        if candidate.dataset.version() != remote {
            debug!(
                version = candidate.dataset.version(),
                remote_version = %remote,
                "catalog version differs from version resource"
            );
        }

        let mut warnings = candidate.warnings;
        let next = candidate.dataset.version().to_string();
        let stats = candidate.dataset.stats();
        self.active.store(Arc::new(candidate.dataset));
        self.force_fetch.store(false, Ordering::Release);
        info!(previous = %current, version = %next, %stats, "catalog updated");

        if let Some(path) = &self.cache_file {
            if let Err(err) = write_cache_file(path, &bytes) {
                warn!(
                    locator = %path.display(),
                    stage = %RefreshStage::Cache,
                    "could not write cache file: {}",
                    err
                );
                warnings.push(format!("{}: could not write cache file: {}", path.display(), err));
            }
        }
        *self.last_warnings.lock() = warnings;

        RefreshOutcome::Updated {
            previous: current,
            current: next,
        }
    }

    /// First line of the version resource, trimmed.
    fn fetch_version(&self) -> std::result::Result<String, RefreshFailure> {
        let bytes = self
            .fetcher
            .fetch(&self.version)
            .map_err(|err| RefreshFailure::new(RefreshStage::VersionCheck, err))?;
        let text = decode(&bytes, self.encoding)
            .map_err(|err| RefreshFailure::new(RefreshStage::VersionCheck, err))?;
        let token = text.lines().next().unwrap_or("").trim();
        if token.is_empty() {
            return Err(RefreshFailure::new(
                RefreshStage::VersionCheck,
                "version resource is empty",
            ));
        }
        Ok(token.to_string())
    }

    fn validate(&self, bytes: &[u8]) -> std::result::Result<Candidate, RefreshFailure> {
        accept(self.reader.read(bytes, self.encoding))
    }
}

/// Accept a read only if it is non-empty and every entity hash verifies.
/// Other reader warnings stay diagnostics.
fn accept(outcome: ReadOutcome) -> std::result::Result<Candidate, RefreshFailure> {
    if outcome.dataset.is_empty() {
        let reason = outcome
            .warnings
            .last()
            .cloned()
            .unwrap_or_else(|| Error::EmptyCatalog.to_string());
        return Err(RefreshFailure {
            stage: RefreshStage::Read,
            reason,
            warnings: outcome.warnings,
        });
    }
    let mismatches = outcome.dataset.verify_checksums();
    if !mismatches.is_empty() {
        let mut warnings = outcome.warnings;
        warnings.extend(mismatches);
        return Err(RefreshFailure {
            stage: RefreshStage::Validate,
            reason: "checksum verification failed".into(),
            warnings,
        });
    }
    Ok(Candidate {
        dataset: outcome.dataset,
        warnings: outcome.warnings,
    })
}

struct Candidate {
    dataset: Dataset,
    warnings: Vec<String>,
}

/// Clears the in-flight flag, also when a cycle unwinds.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Write via a temp file in the same directory, then rename over `path`.
fn write_cache_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct CatalogStoreBuilder {
    catalog: Locator,
    version: Locator,
    fallback: Option<Dataset>,
    fetcher: Option<Arc<dyn Fetcher>>,
    reader: Option<Arc<dyn CatalogReader>>,
    encoding: &'static Encoding,
    comparator: VersionComparator,
    cache_file: Option<PathBuf>,
    config: RefreshConfig,
}

impl CatalogStoreBuilder {
    pub fn new(catalog: Locator, version: Locator) -> Self {
        Self {
            catalog,
            version,
            fallback: None,
            fetcher: None,
            reader: None,
            encoding: UTF_8,
            comparator: VersionComparator::default(),
            cache_file: None,
            config: RefreshConfig::default(),
        }
    }

    /// Dataset served until the first successful refresh. Required.
    pub fn fallback(mut self, dataset: Dataset) -> Self {
        self.fallback = Some(dataset);
        self
    }

    /// Defaults to a [`DefaultFetcher`] with the configured fetch timeout.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Defaults to the JSON [`DocumentReader`].
    pub fn reader(mut self, reader: Arc<dyn CatalogReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn comparator(mut self, comparator: VersionComparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    pub fn config(mut self, config: RefreshConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CatalogStore> {
        self.config.validate()?;
        if self.catalog == self.version {
            return Err(Error::invalid_argument(
                "catalog and version resources must be distinct",
            ));
        }
        let fallback = self
            .fallback
            .ok_or_else(|| Error::invalid_argument("a fallback dataset is required"))?;
        if fallback.is_empty() {
            return Err(Error::invalid_argument("the fallback dataset must not be empty"));
        }
        if let Some(mismatch) = fallback.verify_checksums().into_iter().next() {
            return Err(Error::invalid_argument(format!("fallback dataset: {}", mismatch)));
        }

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(f) => f,
            None => Arc::new(DefaultFetcher::new(self.config.fetch_timeout())?),
        };
        let reader: Arc<dyn CatalogReader> = match self.reader {
            Some(r) => r,
            None => Arc::new(DocumentReader::json().verify_checksums(self.config.verify_checksums)),
        };

        let mut warnings = Vec::new();
        let (initial, force_fetch) = match &self.cache_file {
            None => (fallback, false),
            Some(path) => {
                match load_cache_file(path, reader.as_ref(), self.encoding, &mut warnings) {
                    Some(cached) => (cached, false),
                    None => (fallback, true),
                }
            }
        };
        info!(
            version = initial.version(),
            stats = %initial.stats(),
            catalog = %self.catalog,
            "catalog store ready"
        );

        Ok(CatalogStore {
            active: ArcSwap::from_pointee(initial),
            catalog: self.catalog,
            version: self.version,
            fetcher,
            reader,
            encoding: self.encoding,
            comparator: self.comparator,
            cache_file: self.cache_file,
            config: self.config,
            refreshing: AtomicBool::new(false),
            force_fetch: AtomicBool::new(force_fetch),
            last_warnings: Mutex::new(warnings),
            last_update_check: Mutex::new(None),
        })
    }
}

/// A valid, non-empty cached catalog, or `None` to fall back.
fn load_cache_file(
    path: &Path,
    reader: &dyn CatalogReader,
    encoding: &'static Encoding,
    warnings: &mut Vec<String>,
) -> Option<Dataset> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(locator = %path.display(), "no cache file yet");
            return None;
        }
        Err(err) => {
            warn!(locator = %path.display(), "could not read cache file: {}", err);
            warnings.push(format!("{}: {}", path.display(), err));
            return None;
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!(locator = %path.display(), "cache file is empty");
        return None;
    }

    match accept(reader.read(&bytes, encoding)) {
        Ok(candidate) => {
            warnings.extend(candidate.warnings);
            Some(candidate.dataset)
        }
        Err(failure) => {
            warn!(
                locator = %path.display(),
                stage = %failure.stage,
                warnings = ?failure.warnings,
                "ignoring invalid cache file: {}",
                failure.reason
            );
            warnings.extend(failure.warnings);
            None
        }
    }
}
