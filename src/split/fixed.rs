use super::naming::ChunkNamer;
use super::scan::LineScanner;
use super::sink::ChunkSink;
use super::{SplitError, SplitOutcome, MANIFEST_NAME};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Splits an input file strictly every N bytes (respecting line boundaries)
/// or every N lines, optionally re-emitting the first input line at the top
/// of every chunk after the first.
///
/// Chunk ordinals are 1-based and kept across runs on the same instance, so
/// a cancelled-and-restarted run never reuses an ordinal. One instance
/// drives one run at a time and must not be shared between threads.
pub struct FixedSplitter {
    input: PathBuf,
    output_dir: PathBuf,
    namer: ChunkNamer,
    manifest_name: String,
    cancel: Arc<AtomicBool>,
    next_ordinal: u32,
}

impl FixedSplitter {
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, SplitError> {
        let input = input.into();
        let output_dir = output_dir.into();
        if !input.is_file() {
            return Err(SplitError::InputNotFound(input));
        }
        if !output_dir.is_dir() {
            return Err(SplitError::OutputDirInvalid(output_dir));
        }
        let namer = ChunkNamer::new(&input);
        Ok(Self {
            input,
            output_dir,
            namer,
            manifest_name: MANIFEST_NAME.to_string(),
            cancel: Arc::new(AtomicBool::new(false)),
            next_ordinal: 1,
        })
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.namer = self.namer.with_delimiter(delimiter);
        self
    }

    pub fn with_zero_fill(mut self, zero_fill: usize) -> Result<Self, SplitError> {
        self.namer = self.namer.with_zero_fill(zero_fill)?;
        Ok(self)
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Cooperative terminate flag, polled at each line and after each chunk
    /// callback. May be set from inside the callback.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn check_input_not_empty(&self) -> Result<(), SplitError> {
        if fs::metadata(&self.input)?.len() == 0 {
            return Err(SplitError::EmptyInput(self.input.clone()));
        }
        Ok(())
    }

    /// Split into chunks of at most `budget_bytes`, never cutting a line in
    /// two. A single line larger than the budget is written alone; the chunk
    /// holding it exceeds the nominal budget because line atomicity outranks
    /// the byte budget.
    pub fn split_by_size(
        &mut self,
        budget_bytes: u64,
        include_header: bool,
        on_chunk: &mut dyn FnMut(&Path, u64),
    ) -> Result<SplitOutcome, SplitError> {
        if budget_bytes == 0 {
            return Err(SplitError::InvalidChunkSize(
                "byte budget must be at least 1".to_string(),
            ));
        }
        self.check_input_not_empty()?;

        let mut scanner = LineScanner::new(BufReader::new(File::open(&self.input)?));
        let mut sink = ChunkSink::new(
            &self.output_dir,
            &self.namer,
            &self.manifest_name,
            self.next_ordinal,
            on_chunk,
        )?;
        let mut header: Option<Vec<u8>> = None;
        let mut buf = Vec::new();
        let mut first_line = true;

        while scanner.read_line(&mut buf)?.is_some() {
            if self.cancelled() {
                return Self::stop_cancelled(&mut self.next_ordinal, sink);
            }
            if include_header && first_line {
                header = Some(buf.clone());
            }
            first_line = false;

            if sink.has_open() && sink.current_bytes() + buf.len() as u64 > budget_bytes {
                sink.flush_chunk()?;
                if self.cancelled() {
                    return Self::stop_cancelled(&mut self.next_ordinal, sink);
                }
            }
            if !sink.has_open() && sink.flushed() > 0 {
                if let Some(h) = &header {
                    sink.write(h)?;
                    sink.mark_duplicated_header();
                }
            }
            sink.write(&buf)?;
        }

        sink.flush_chunk()?;
        self.next_ordinal = sink.next_ordinal();
        let chunks = sink.finish()?;
        Ok(SplitOutcome::Completed { chunks })
    }

    /// Split into chunks of exactly `line_count` lines (the last chunk may
    /// be shorter). A re-emitted header line does not count toward the
    /// budget; the natural first line of the input does.
    pub fn split_by_lines(
        &mut self,
        line_count: u64,
        include_header: bool,
        on_chunk: &mut dyn FnMut(&Path, u64),
    ) -> Result<SplitOutcome, SplitError> {
        if line_count == 0 {
            return Err(SplitError::InvalidChunkSize(
                "line count must be at least 1".to_string(),
            ));
        }
        self.check_input_not_empty()?;

        let mut scanner = LineScanner::new(BufReader::new(File::open(&self.input)?));
        let mut sink = ChunkSink::new(
            &self.output_dir,
            &self.namer,
            &self.manifest_name,
            self.next_ordinal,
            on_chunk,
        )?;
        let mut header: Option<Vec<u8>> = None;
        let mut buf = Vec::new();
        let mut first_line = true;
        let mut lines_in_chunk: u64 = 0;

        while scanner.read_line(&mut buf)?.is_some() {
            if self.cancelled() {
                return Self::stop_cancelled(&mut self.next_ordinal, sink);
            }
            if include_header && first_line {
                header = Some(buf.clone());
            }
            first_line = false;

            if lines_in_chunk == line_count {
                sink.flush_chunk()?;
                lines_in_chunk = 0;
                if self.cancelled() {
                    return Self::stop_cancelled(&mut self.next_ordinal, sink);
                }
            }
            if !sink.has_open() && sink.flushed() > 0 {
                if let Some(h) = &header {
                    sink.write(h)?;
                    sink.mark_duplicated_header();
                }
            }
            sink.write(&buf)?;
            lines_in_chunk += 1;
        }

        sink.flush_chunk()?;
        self.next_ordinal = sink.next_ordinal();
        let chunks = sink.finish()?;
        Ok(SplitOutcome::Completed { chunks })
    }

    /// Clean early stop: the unflushed chunk in progress is deleted, the
    /// manifest keeps only flushed rows.
    fn stop_cancelled(
        next_ordinal: &mut u32,
        mut sink: ChunkSink<'_>,
    ) -> Result<SplitOutcome, SplitError> {
        info!("terminate flag set, stopping split");
        sink.discard_current()?;
        *next_ordinal = sink.next_ordinal();
        let chunks = sink.finish()?;
        Ok(SplitOutcome::Cancelled { chunks })
    }
}
