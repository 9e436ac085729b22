use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("navigation record {index} missing at {}", .path.display())]
    MissingRecord { index: usize, path: PathBuf },

    #[error("navigation record {index} at {} has {fields} numeric fields, expected 6", .path.display())]
    MalformedRecord {
        index: usize,
        path: PathBuf,
        fields: usize,
    },

    #[error("sensor file {} does not exist", .path.display())]
    SensorFileAbsent { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bad timestamp in {} line {line}: {message}", .path.display())]
    Timestamp {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
