mod error;
mod fixed;
mod grouped;
mod manifest;
mod naming;
mod scan;
mod sink;


pub use error::SplitError;
pub use fixed::FixedSplitter;
pub use grouped::GroupedPrefixSplitter;
pub use manifest::ManifestWriter;
pub use naming::ChunkNamer;
pub use scan::{ByteSpan, LineScanner};

/// Default byte budget per chunk (1 MB)
pub const DEFAULT_CHUNK_SIZE: u64 = 1_000_000;

/// Delimiter placed between the input stem and the chunk ordinal
pub const SPLIT_DELIMITER: char = '_';

/// Default zero-fill width for chunk ordinals
pub const ZERO_FILL: usize = 4;

pub const MIN_ZERO_FILL: usize = 1;
pub const MAX_ZERO_FILL: usize = 10;

/// Default name of the per-run audit manifest
pub const MANIFEST_NAME: &str = "manifest";

/// How a split run ended: every flushed chunk was reported through the
/// callback before this value is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The whole input was consumed
    Completed { chunks: u32 },
    /// The terminate flag was observed; unflushed output was discarded
    Cancelled { chunks: u32 },
}

impl SplitOutcome {
    /// Number of chunks flushed to disk
    pub fn chunks(&self) -> u32 {
        match self {
            SplitOutcome::Completed { chunks } | SplitOutcome::Cancelled { chunks } => *chunks,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SplitOutcome::Cancelled { .. })
    }
}
