use thiserror::Error;

/// A key-value store could not be read or written.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed for key {key}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode value for key {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A stored or imported session did not have the expected shape.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no board array")]
    MissingBoard,
    #[error("tile {index} is malformed")]
    MalformedTile {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("board has {tiles} tiles, which is not a 3×3, 4×4 or 5×5 card")]
    BoardSizeMismatch { tiles: usize },
}

/// An export envelope could not be imported.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("import is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unsupported export version {0}")]
    UnsupportedVersion(i64),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A share link could not be decoded.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("no share payload in link")]
    Missing,
    #[error("share payload is not valid base64")]
    Base64(#[from] base64::DecodeError),
    #[error("share payload is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("share payload is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("share payload has no goal list")]
    MissingGoals,
}
