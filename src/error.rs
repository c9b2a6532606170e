use std::path::PathBuf;
use thiserror::Error;

pub type LoopResult<T> = Result<T, LoopError>;

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("Cannot access {kind} file {}", path.display())]
    FileNotAccessible { kind: &'static str, path: PathBuf },
    #[error("Malformed timestamp data in record {index}: {reason}")]
    MalformedTimestampData { index: usize, reason: String },
    #[error("Time invalid: {value}")]
    InvalidTimeFormat { value: String },
    #[error("Row {row} is out of range ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },
    #[error("Column {column} does not exist")]
    InvalidColumn { column: usize },
    #[error("Cannot play media file {}: {reason}", path.display())]
    MediaError { path: PathBuf, reason: String },
    #[error("No {what} file chosen")]
    NothingToPlay { what: &'static str },
    #[error("Media engine error: {message}")]
    Engine { message: String },
    #[error("Failed to read config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid setting `{field}` in '{}': {reason}", path.display())]
    InvalidSetting {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl LoopError {
    pub fn engine(message: impl Into<String>) -> Self {
        LoopError::Engine {
            message: message.into(),
        }
    }

    pub fn invalid_time(value: impl Into<String>) -> Self {
        LoopError::InvalidTimeFormat {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = LoopError::FileNotAccessible {
            kind: "timestamp",
            path: PathBuf::from("/tmp/missing.tmsp"),
        };
        assert_eq!(
            err.to_string(),
            "Cannot access timestamp file /tmp/missing.tmsp"
        );
        assert_eq!(LoopError::invalid_time("1:2").to_string(), "Time invalid: 1:2");
        assert_eq!(
            LoopError::NothingToPlay { what: "video" }.to_string(),
            "No video file chosen"
        );
    }
}
