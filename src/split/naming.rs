use super::{SplitError, MAX_ZERO_FILL, MIN_ZERO_FILL, SPLIT_DELIMITER, ZERO_FILL};
use std::path::Path;

/// Produces chunk file names of the form
/// `{stem}{delimiter}{zero-padded ordinal}{ext}`, derived from the input
/// file name.
#[derive(Debug, Clone)]
pub struct ChunkNamer {
    stem: String,
    ext: String,
    delimiter: char,
    zero_fill: usize,
}

impl ChunkNamer {
    pub fn new(input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            stem,
            ext,
            delimiter: SPLIT_DELIMITER,
            zero_fill: ZERO_FILL,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_zero_fill(mut self, zero_fill: usize) -> Result<Self, SplitError> {
        if !(MIN_ZERO_FILL..=MAX_ZERO_FILL).contains(&zero_fill) {
            return Err(SplitError::ZeroFillOutOfRange);
        }
        self.zero_fill = zero_fill;
        Ok(self)
    }

    /// Name for the chunk with the given 1-based ordinal. Ordinals with more
    /// digits than the zero-fill width are rendered unpadded; callers must
    /// size the width for the expected chunk count.
    pub fn chunk_name(&self, ordinal: u32) -> String {
        format!(
            "{}{}{:0width$}{}",
            self.stem,
            self.delimiter,
            ordinal,
            self.ext,
            width = self.zero_fill
        )
    }
}

#[cfg(test)]
mod naming_tests {
    use super::*;

    #[test]
    fn test_default_name() {
        let namer = ChunkNamer::new(Path::new("/tmp/data.nt"));
        assert_eq!(namer.chunk_name(1), "data_0001.nt");
        assert_eq!(namer.chunk_name(42), "data_0042.nt");
    }

    #[test]
    fn test_custom_delimiter_and_width() {
        let namer = ChunkNamer::new(Path::new("data.csv"))
            .with_delimiter('-')
            .with_zero_fill(9)
            .unwrap();
        assert_eq!(namer.chunk_name(3), "data-000000003.csv");
    }

    #[test]
    fn test_no_extension() {
        let namer = ChunkNamer::new(Path::new("/var/log/archive"));
        assert_eq!(namer.chunk_name(1), "archive_0001");
    }

    #[test]
    fn test_ordinal_wider_than_fill() {
        let namer = ChunkNamer::new(Path::new("d.txt")).with_zero_fill(1).unwrap();
        assert_eq!(namer.chunk_name(9), "d_9.txt");
        assert_eq!(namer.chunk_name(12), "d_12.txt");
    }

    #[test]
    fn test_zero_fill_out_of_range() {
        let namer = ChunkNamer::new(Path::new("d.txt"));
        assert!(matches!(
            namer.clone().with_zero_fill(0),
            Err(SplitError::ZeroFillOutOfRange)
        ));
        assert!(matches!(
            namer.with_zero_fill(11),
            Err(SplitError::ZeroFillOutOfRange)
        ));
    }
}
