use std::path::PathBuf;
use thiserror::Error;

/// Failure while turning one report into a record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportError {
    #[error("line {line}: invalid value {value:?} for metric {metric:?}")]
    Parse {
        line: usize,
        metric: String,
        value: String,
    },

    #[error("line {line}: metric {metric:?} has no value column")]
    MissingValue { line: usize, metric: String },

    #[error("required metric {0:?} not found in report")]
    MissingField(&'static str),

    #[error("sample {sample:?} has zero total reads, isomiR percentage is undefined")]
    Division { sample: String },
}

/// A per-file failure with the file attached.
#[derive(Debug, Error)]
#[error("failed to process {}", .path.display())]
pub struct FileError {
    pub path: PathBuf,
    #[source]
    pub source: FileErrorKind,
}

#[derive(Debug, Error)]
pub enum FileErrorKind {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("{0:#}")]
    Read(anyhow::Error),
}

/// Nothing was left to report after every input was processed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no miRTop reports found")]
pub struct EmptyResultError;
