use thiserror::Error;

use crate::reader::Format;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse event on line {line}: {source}")]
    JsonLine {
        line: usize,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {format} input: {msg}")]
    Parse { format: Format, msg: String },

    #[error("Support for {0} input was not compiled in")]
    Unsupported(Format),

    #[error("Event {event} has no collection `{name}`")]
    MissingCollection { event: i32, name: String },

    #[error("Collection `{name}` in event {event} holds {found} elements, expected {expected}")]
    CollectionType {
        event: i32,
        name: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("Invalid binning: {0}")]
    Binning(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
