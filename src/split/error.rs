use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("input file {0:?} does not exist")]
    InputNotFound(PathBuf),

    #[error("input file {0:?} is empty")]
    EmptyInput(PathBuf),

    #[error("output path {0:?} is not a valid directory")]
    OutputDirInvalid(PathBuf),

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("zero fill must be between 1 and 10")]
    ZeroFillOutOfRange,

    #[error("start ordinal must be at least 1")]
    InvalidStartOrdinal,

    #[error("incompatible options: {0}")]
    IncompatibleOptions(&'static str),

    #[error("group with prefix \"{prefix}\" exceeds max chunk size ({size} > {budget} bytes)")]
    GroupTooLarge {
        prefix: String,
        size: u64,
        budget: u64,
    },

    #[error("manifest: {0}")]
    Manifest(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
