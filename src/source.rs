use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Where a catalog or version resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Http(Url),
    File(PathBuf),
    /// In-memory content, mostly useful for fallbacks and tests.
    Inline(Arc<str>),
}

impl Locator {
    /// `http(s)://` and `file://` URLs, or a plain filesystem path.
    pub fn parse(locator: &str) -> Result<Self> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(Error::invalid_argument("locator must not be empty"));
        }
        match Url::parse(locator) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Http(url)),
                "file" => url.to_file_path().map(Self::File).map_err(|_| {
                    Error::invalid_argument(format!("not a local file URL: {}", locator))
                }),
                // A drive letter, as in `C:\data\catalog.json`.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(locator))),
                scheme => Err(Error::invalid_argument(format!(
                    "unsupported locator scheme '{}'",
                    scheme
                ))),
            },
            // Relative paths and bare names are not URLs.
            Err(_) => Ok(Self::File(PathBuf::from(locator))),
        }
    }

    pub fn inline(content: impl Into<Arc<str>>) -> Self {
        Self::Inline(content.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Http(url) => write!(f, "{}", url),
            Locator::File(path) => write!(f, "{}", path.display()),
            Locator::Inline(content) => write!(f, "<inline, {} bytes>", content.len()),
        }
    }
}

/// Retrieves the raw bytes behind a [`Locator`].
pub trait Fetcher: Send + Sync {
    fn fetch(&self, locator: &Locator) -> Result<Vec<u8>>;
}

/// Blocking HTTP client plus local file and inline access.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    client: reqwest::blocking::Client,
}

impl DefaultFetcher {
    /// Every HTTP request is aborted after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("uadetector-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, locator: &Locator) -> Result<Vec<u8>> {
        match locator {
            Locator::Http(url) => {
                let response = self.client.get(url.clone()).send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::HttpStatus {
                        locator: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes()?.to_vec())
            }
            Locator::File(path) => Ok(std::fs::read(path)?),
            Locator::Inline(content) => Ok(content.as_bytes().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locators() {
        assert!(matches!(
            Locator::parse("https://example.org/catalog.json").unwrap(),
            Locator::Http(_)
        ));
        assert_eq!(
            Locator::parse("data/catalog.yml").unwrap(),
            Locator::File(PathBuf::from("data/catalog.yml"))
        );
        assert_eq!(
            Locator::parse("file:///tmp/catalog.yml").unwrap(),
            Locator::File(PathBuf::from("/tmp/catalog.yml"))
        );
        assert_eq!(
            Locator::parse("C:\\data\\uas.json").unwrap(),
            Locator::File(PathBuf::from("C:\\data\\uas.json"))
        );
        assert_eq!(
            Locator::parse("d:/catalogs/uas.yml").unwrap(),
            Locator::File(PathBuf::from("d:/catalogs/uas.yml"))
        );
    }

    #[test]
    fn bad_locators_are_input_errors() {
        assert!(matches!(Locator::parse("  "), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            Locator::parse("ftp://example.org/x"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn inline_and_file_fetch() {
        let fetcher = DefaultFetcher::new(Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.fetch(&Locator::inline("2024.01")).unwrap(), b"2024.01");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"v9").unwrap();
        let loc = Locator::File(file.path().to_path_buf());
        assert_eq!(fetcher.fetch(&loc).unwrap(), b"v9");

        let missing = Locator::File(PathBuf::from("/nonexistent/uadetector/catalog"));
        assert!(matches!(fetcher.fetch(&missing), Err(Error::IO(_))));
    }
}
