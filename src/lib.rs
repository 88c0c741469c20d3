mod cache;
mod catalog;
pub mod checksum;
mod classifier;
mod config;
pub mod db;
mod detector;
mod error;
mod helpers;
mod literal;
mod parser;
mod parser_data;
mod reader;
mod refresher;
mod source;
mod store;
mod types;
pub mod writer;

pub use cache::CachedParser;
pub use catalog::{Dataset, DatasetStats};
pub use classifier::{Classifier, UserAgentStringParser};
pub use config::{CacheConfig, RefreshConfig, UpdateMode};
pub use detector::classify;
pub use error::{Error, Result};
pub use parser::{Pattern, PatternList};
pub use parser_data::{BrowserData, BrowserTypeData, DeviceData, OsData, RobotData};
pub use reader::{CatalogReader, DocumentReader, Format, ReadOutcome};
pub use refresher::Refresher;
pub use source::{DefaultFetcher, Fetcher, Locator};
pub use store::{
    CatalogStore, CatalogStoreBuilder, RefreshFailure, RefreshOutcome, RefreshStage,
    VersionComparator,
};
pub use types::*;
