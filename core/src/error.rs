pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document bodies and ids differ in length: {documents} bodies, {ids} ids")]
    LengthMismatch { documents: usize, ids: usize },

    #[error("vocabulary is empty")]
    EmptyVocabulary,

    #[error("duplicate document id: {0}")]
    DuplicateDocument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("index format version {found} is not supported (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
