use crate::split::{
    FixedSplitter, GroupedPrefixSplitter, SplitError, SplitOutcome, MANIFEST_NAME, MAX_ZERO_FILL,
    MIN_ZERO_FILL, SPLIT_DELIMITER, ZERO_FILL,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Smallest accepted byte budget
pub const MIN_BYTE_BUDGET: u64 = 1024;

/// Per-chunk ceiling, tagged by mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Bytes(u64),
    Lines(u64),
}

impl Budget {
    pub fn kilobytes(value: f64) -> Self {
        Budget::Bytes((value * 1024.0) as u64)
    }

    pub fn megabytes(value: f64) -> Self {
        Budget::Bytes((value * 1_048_576.0) as u64)
    }

    pub fn gigabytes(value: f64) -> Self {
        Budget::Bytes((value * 1_073_741_824.0) as u64)
    }
}

/// Immutable configuration for one splitting run, validated once at
/// construction. Build through [`SplitJob::builder`].
#[derive(Debug, Clone)]
pub struct SplitJob {
    input: PathBuf,
    output_dir: PathBuf,
    budget: Budget,
    include_header: bool,
    group_by_prefix: bool,
    zero_fill: usize,
    delimiter: char,
    manifest_name: String,
    start_ordinal: u32,
}

impl SplitJob {
    pub fn builder(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> SplitJobBuilder {
        SplitJobBuilder {
            input: input.into(),
            output_dir: output_dir.into(),
            budget: Budget::Bytes(crate::split::DEFAULT_CHUNK_SIZE),
            include_header: false,
            group_by_prefix: false,
            zero_fill: ZERO_FILL,
            delimiter: SPLIT_DELIMITER,
            manifest_name: MANIFEST_NAME.to_string(),
            start_ordinal: 1,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Run the job with a fresh terminate flag.
    pub fn run(&self, on_chunk: &mut dyn FnMut(&Path, u64)) -> Result<SplitOutcome, SplitError> {
        self.run_cancellable(Arc::new(AtomicBool::new(false)), on_chunk)
    }

    /// Run the job polling `cancel` between units of work. The flag may be
    /// set from inside `on_chunk`; the run then stops after the current
    /// flush and reports a cancelled outcome.
    pub fn run_cancellable(
        &self,
        cancel: Arc<AtomicBool>,
        on_chunk: &mut dyn FnMut(&Path, u64),
    ) -> Result<SplitOutcome, SplitError> {
        match (self.group_by_prefix, self.budget) {
            (true, Budget::Bytes(max_bytes)) => {
                let splitter = GroupedPrefixSplitter::new(&self.input, &self.output_dir)?
                    .with_zero_fill(self.zero_fill)?
                    .with_delimiter(self.delimiter)
                    .with_manifest_name(self.manifest_name.as_str())
                    .with_cancel_flag(cancel);
                splitter.split_by_grouped_prefix(max_bytes, self.start_ordinal, on_chunk)
            }
            (true, Budget::Lines(_)) => Err(SplitError::IncompatibleOptions(
                "grouping by prefix requires a byte budget",
            )),
            (false, budget) => {
                let mut splitter = FixedSplitter::new(&self.input, &self.output_dir)?
                    .with_zero_fill(self.zero_fill)?
                    .with_delimiter(self.delimiter)
                    .with_manifest_name(self.manifest_name.as_str())
                    .with_cancel_flag(cancel);
                match budget {
                    Budget::Bytes(bytes) => {
                        splitter.split_by_size(bytes, self.include_header, on_chunk)
                    }
                    Budget::Lines(lines) => {
                        splitter.split_by_lines(lines, self.include_header, on_chunk)
                    }
                }
            }
        }
    }
}

/// Builder for [`SplitJob`]; all validation happens in [`build`], before
/// any output is created.
///
/// [`build`]: SplitJobBuilder::build
#[derive(Debug, Clone)]
pub struct SplitJobBuilder {
    input: PathBuf,
    output_dir: PathBuf,
    budget: Budget,
    include_header: bool,
    group_by_prefix: bool,
    zero_fill: usize,
    delimiter: char,
    manifest_name: String,
    start_ordinal: u32,
}

impl SplitJobBuilder {
    pub fn budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn include_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    pub fn group_by_prefix(mut self, group_by_prefix: bool) -> Self {
        self.group_by_prefix = group_by_prefix;
        self
    }

    pub fn zero_fill(mut self, zero_fill: usize) -> Self {
        self.zero_fill = zero_fill;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn start_ordinal(mut self, start_ordinal: u32) -> Self {
        self.start_ordinal = start_ordinal;
        self
    }

    pub fn build(self) -> Result<SplitJob, SplitError> {
        if !self.input.is_file() {
            return Err(SplitError::InputNotFound(self.input));
        }
        if !self.output_dir.is_dir() {
            return Err(SplitError::OutputDirInvalid(self.output_dir));
        }
        if !(MIN_ZERO_FILL..=MAX_ZERO_FILL).contains(&self.zero_fill) {
            return Err(SplitError::ZeroFillOutOfRange);
        }
        if self.start_ordinal == 0 {
            return Err(SplitError::InvalidStartOrdinal);
        }
        match self.budget {
            Budget::Bytes(bytes) if bytes < MIN_BYTE_BUDGET => {
                return Err(SplitError::InvalidChunkSize(format!(
                    "minimum chunk size is {MIN_BYTE_BUDGET} bytes"
                )));
            }
            Budget::Lines(0) => {
                return Err(SplitError::InvalidChunkSize(
                    "line count must be at least 1".to_string(),
                ));
            }
            _ => {}
        }
        if self.group_by_prefix {
            if self.include_header {
                return Err(SplitError::IncompatibleOptions(
                    "grouping by prefix does not support header duplication",
                ));
            }
            if matches!(self.budget, Budget::Lines(_)) {
                return Err(SplitError::IncompatibleOptions(
                    "grouping by prefix requires a byte budget",
                ));
            }
        }
        Ok(SplitJob {
            input: self.input,
            output_dir: self.output_dir,
            budget: self.budget,
            include_header: self.include_header,
            group_by_prefix: self.group_by_prefix,
            zero_fill: self.zero_fill,
            delimiter: self.delimiter,
            manifest_name: self.manifest_name,
            start_ordinal: self.start_ordinal,
        })
    }
}
