#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),
    #[error(transparent)]
    JSON(#[from] serde_json::Error),
    #[error(transparent)]
    Regex(#[from] fancy_regex::Error),
    #[error(transparent)]
    AhoCorasick(#[from] aho_corasick::BuildError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{locator} answered with HTTP status {status}")]
    HttpStatus { locator: String, status: u16 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{entity} {id}: checksum mismatch (stored {expected}, computed {actual})")]
    Checksum {
        entity: &'static str,
        id: u32,
        expected: String,
        actual: String,
    },
    #[error("{entity} {id}: field '{field}' references unknown id {target}")]
    UnknownReference {
        entity: &'static str,
        id: u32,
        field: &'static str,
        target: u32,
    },
    #[error("{entity} {id}: duplicate id")]
    DuplicateId { entity: &'static str, id: u32 },
    #[error("pattern {id}: unsupported regex flag '{flag}'")]
    InvalidFlags { id: u32, flag: char },
    #[error("catalog contains no patterns and no robots")]
    EmptyCatalog,
    #[error("input is not valid {0}")]
    Encoding(&'static str),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
