use encoding_rs::Encoding;
use tracing::debug;

use crate::catalog::Dataset;
use crate::db::CatalogDocument;
use crate::error::{Error, Result};
use crate::source::{Fetcher, Locator};

/// Dataset produced by a reader plus everything it had to say about the input.
///
/// On failure `dataset` is [`Dataset::empty`] and `warnings` explains why.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub dataset: Dataset,
    pub warnings: Vec<String>,
}

impl ReadOutcome {
    fn failed(mut warnings: Vec<String>, err: Error) -> Self {
        warnings.push(err.to_string());
        Self {
            dataset: Dataset::empty(),
            warnings,
        }
    }
}

/// Turns raw catalog bytes into a candidate [`Dataset`].
///
/// Implementations never fail: malformed input yields an empty dataset and
/// warnings. They must be callable concurrently.
pub trait CatalogReader: Send + Sync {
    fn read(&self, bytes: &[u8], encoding: &'static Encoding) -> ReadOutcome;

    fn read_from(
        &self,
        fetcher: &dyn Fetcher,
        locator: &Locator,
        encoding: &'static Encoding,
    ) -> ReadOutcome {
        match fetcher.fetch(locator) {
            Ok(bytes) => self.read(&bytes, encoding),
            Err(err) => ReadOutcome::failed(vec![format!("could not fetch {}", locator)], err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// Reads the kebab-case catalog document in JSON or YAML.
#[derive(Debug, Clone)]
pub struct DocumentReader {
    format: Format,
    verify_checksums: bool,
}

impl DocumentReader {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            verify_checksums: true,
        }
    }

    pub fn json() -> Self {
        Self::new(Format::Json)
    }

    pub fn yaml() -> Self {
        Self::new(Format::Yaml)
    }

    /// Skip hash verification while reading. Tooling only; a store re-verifies
    /// every candidate regardless.
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    fn parse(&self, text: &str) -> Result<CatalogDocument> {
        Ok(match self.format {
            Format::Json => serde_json::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
        })
    }

    fn try_read(
        &self,
        bytes: &[u8],
        encoding: &'static Encoding,
        warnings: &mut Vec<String>,
    ) -> Result<Dataset> {
        let text = decode(bytes, encoding)?;
        let doc = self.parse(&text)?;
        let dataset = Dataset::from_document(doc, self.verify_checksums, warnings)?;
        if dataset.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(dataset)
    }
}

impl CatalogReader for DocumentReader {
    fn read(&self, bytes: &[u8], encoding: &'static Encoding) -> ReadOutcome {
        let mut warnings = Vec::new();
        match self.try_read(bytes, encoding, &mut warnings) {
            Ok(dataset) => {
                debug!(version = dataset.version(), stats = %dataset.stats(), "catalog read");
                ReadOutcome { dataset, warnings }
            }
            Err(err) => ReadOutcome::failed(warnings, err),
        }
    }
}

/// Decode `bytes`, honoring a byte-order mark over `encoding`.
pub(crate) fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
        .ok_or(Error::Encoding(encoding.name()))
}
