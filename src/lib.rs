// Public API exports
pub mod config;
pub mod split;

// Re-export main types for convenience
pub use config::{Budget, SplitJob, SplitJobBuilder};

pub use split::{
    ByteSpan, ChunkNamer, FixedSplitter, GroupedPrefixSplitter, LineScanner, ManifestWriter,
    SplitError, SplitOutcome, DEFAULT_CHUNK_SIZE, MANIFEST_NAME, MAX_ZERO_FILL, MIN_ZERO_FILL,
    SPLIT_DELIMITER, ZERO_FILL,
};
