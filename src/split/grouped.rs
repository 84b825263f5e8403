use super::naming::ChunkNamer;
use super::scan::{ByteSpan, LineScanner};
use super::sink::ChunkSink;
use super::{SplitError, SplitOutcome, MANIFEST_NAME};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Splits an ordered file while keeping lines that share the same leading
/// whitespace-delimited token together, packing whole groups into chunks
/// without exceeding a byte budget. A group is never split across two
/// chunks; a single group larger than the budget is a fatal error.
///
/// Groups are tracked as byte spans in the input and copied to the output
/// through a second read handle, so neither a group nor a chunk is ever
/// materialized in memory.
pub struct GroupedPrefixSplitter {
    input: PathBuf,
    output_dir: PathBuf,
    namer: ChunkNamer,
    manifest_name: String,
    cancel: Arc<AtomicBool>,
}

/// Open group: prefix plus the input spans covering its lines. Spans only
/// break where skipped blank lines interrupt the run, so the list stays
/// short regardless of group size.
struct Group {
    prefix: Vec<u8>,
    spans: Vec<ByteSpan>,
    size: u64,
}

impl Group {
    fn open(prefix: &[u8], span: ByteSpan) -> Self {
        Self {
            prefix: prefix.to_vec(),
            spans: vec![span],
            size: span.len,
        }
    }

    fn extend(&mut self, span: ByteSpan) {
        match self.spans.last_mut() {
            Some(last) if last.end() == span.start => last.len += span.len,
            _ => self.spans.push(span),
        }
        self.size += span.len;
    }
}

impl GroupedPrefixSplitter {
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

    /// Cooperative terminate flag, polled at each line. May be set from
    /// inside the chunk callback.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Single forward pass over the input. Blank and whitespace-only lines
    /// are skipped: they are not written and neither open nor close a group.
    /// Chunk numbering starts at `start_ordinal` so repeated runs against
    /// the same output location can resume numbering.
    pub fn split_by_grouped_prefix(
        &self,
        max_bytes: u64,
        start_ordinal: u32,
        on_chunk: &mut dyn FnMut(&Path, u64),
    ) -> Result<SplitOutcome, SplitError> {
        if max_bytes == 0 {
            return Err(SplitError::InvalidChunkSize(
                "byte budget must be at least 1".to_string(),
            ));
        }
        if start_ordinal == 0 {
            return Err(SplitError::InvalidStartOrdinal);
        }
        if fs::metadata(&self.input)?.len() == 0 {
            return Err(SplitError::EmptyInput(self.input.clone()));
        }

        let mut scanner = LineScanner::new(BufReader::new(File::open(&self.input)?));
        let mut copy_handle = File::open(&self.input)?;
        let mut sink = ChunkSink::new(
            &self.output_dir,
            &self.namer,
            &self.manifest_name,
            start_ordinal,
            on_chunk,
        )?;
        let mut group: Option<Group> = None;
        let mut buf = Vec::new();

        while let Some(span) = scanner.read_line(&mut buf)? {
            if self.cancelled() {
                return stop_cancelled(sink);
            }
            let Some(prefix) = leading_token(&buf) else {
                continue;
            };
            let same_prefix = group.as_ref().map_or(false, |g| g.prefix == prefix);
            if same_prefix {
                if let Some(open) = group.as_mut() {
                    open.extend(span);
                }
            } else {
                if let Some(done) = group.take() {
                    place_group(&mut sink, &mut copy_handle, done, max_bytes)?;
                }
                group = Some(Group::open(prefix, span));
            }
        }

        if let Some(done) = group.take() {
            place_group(&mut sink, &mut copy_handle, done, max_bytes)?;
        }
        if self.cancelled() {
            return stop_cancelled(sink);
        }
        sink.flush_chunk()?;
        let chunks = sink.finish()?;
        Ok(SplitOutcome::Completed { chunks })
    }
}

/// Clean early stop: the unflushed chunk in progress is deleted, the
/// manifest keeps only flushed rows.
fn stop_cancelled(mut sink: ChunkSink<'_>) -> Result<SplitOutcome, SplitError> {
    info!("terminate flag set, stopping split");
    sink.discard_current()?;
    let chunks = sink.finish()?;
    Ok(SplitOutcome::Cancelled { chunks })
}

/// Place a completed group: reject it if it alone exceeds the budget, flush
/// the chunk in progress if the group no longer fits, then copy the group's
/// spans into the (possibly new) chunk.
fn place_group(
    sink: &mut ChunkSink<'_>,
    copy_handle: &mut File,
    group: Group,
    max_bytes: u64,
) -> Result<(), SplitError> {
    if group.size > max_bytes {
        // Unflushed partial output is not salvaged; flushed chunks stay.
        sink.discard_current()?;
        return Err(SplitError::GroupTooLarge {
            prefix: String::from_utf8_lossy(&group.prefix).into_owned(),
            size: group.size,
            budget: max_bytes,
        });
    }
    if sink.has_open() && sink.current_bytes() + group.size > max_bytes {
        sink.flush_chunk()?;
    }
    for span in &group.spans {
        sink.copy_span(copy_handle, *span)?;
    }
    Ok(())
}

/// First whitespace-delimited token of a line, or `None` for blank and
/// whitespace-only lines.
fn leading_token(line: &[u8]) -> Option<&[u8]> {
    let start = line.iter().position(|b| !b.is_ascii_whitespace())?;
    let rest = &line[start..];
    let end = rest
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod token_tests {
    use super::leading_token;

    #[test]
    fn test_leading_token() {
        assert_eq!(leading_token(b"abc def\n"), Some(&b"abc"[..]));
        assert_eq!(leading_token(b"  abc\tdef\n"), Some(&b"abc"[..]));
        assert_eq!(leading_token(b"solo"), Some(&b"solo"[..]));
        assert_eq!(leading_token(b"\n"), None);
        assert_eq!(leading_token(b"   \t \n"), None);
        assert_eq!(leading_token(b""), None);
    }
}
