//! Error types for configuration, training and trip ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// An invalid or missing configuration option.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("zone count must be at least 1")]
    InvalidZoneCount,
    #[error("time slot length must divide a 1440-minute day, got {0}")]
    InvalidSlotLength(u32),
    #[error("look-ahead slot count must be at least 1")]
    InvalidLookahead,
    #[error("training dataset path must be set")]
    MissingDataset,
    #[error("k-means iteration cap must be at least 1")]
    InvalidIterationCap,
    #[error("clustering sample must cover at least 1 day")]
    InvalidSampleDays,
}

/// A failure that aborts training.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open training dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("road network has no intersections")]
    EmptyNetwork,
    #[error("no trip record inside the network region")]
    EmptyDataset,
}

/// Why a single trip record was skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[from] csv::Error),
    #[error("unparseable timestamp {0:?}")]
    Timestamp(String),
}
