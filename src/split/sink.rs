use super::manifest::ManifestWriter;
use super::naming::ChunkNamer;
use super::scan::ByteSpan;
use super::SplitError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Shared output plumbing for both splitters: owns the chunk file in
/// progress, the manifest, and the per-chunk callback. A chunk only becomes
/// visible to the caller (file closed, manifest row, callback) at flush;
/// an unflushed chunk can still be discarded without a trace.
pub(crate) struct ChunkSink<'a> {
    output_dir: &'a Path,
    namer: &'a ChunkNamer,
    manifest: ManifestWriter,
    on_chunk: &'a mut dyn FnMut(&Path, u64),
    current: Option<OpenChunk>,
    next_ordinal: u32,
    flushed: u32,
}

struct OpenChunk {
    writer: BufWriter<File>,
    path: PathBuf,
    name: String,
    bytes: u64,
    duplicated_header: bool,
}

impl<'a> ChunkSink<'a> {
    pub(crate) fn new(
        output_dir: &'a Path,
        namer: &'a ChunkNamer,
        manifest_name: &str,
        start_ordinal: u32,
        on_chunk: &'a mut dyn FnMut(&Path, u64),
    ) -> Result<Self, SplitError> {
        let manifest = ManifestWriter::create(output_dir, manifest_name)?;
        Ok(Self {
            output_dir,
            namer,
            manifest,
            on_chunk,
            current: None,
            next_ordinal: start_ordinal,
            flushed: 0,
        })
    }

    pub(crate) fn has_open(&self) -> bool {
        self.current.is_some()
    }

    /// Bytes written to the chunk in progress (0 if none is open)
    pub(crate) fn current_bytes(&self) -> u64 {
        self.current.as_ref().map_or(0, |c| c.bytes)
    }

    pub(crate) fn flushed(&self) -> u32 {
        self.flushed
    }

    pub(crate) fn next_ordinal(&self) -> u32 {
        self.next_ordinal
    }

    /// Write raw bytes to the chunk in progress, opening the next chunk
    /// file if none is open. Chunk files are created fresh and never
    /// silently overwrite existing output.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> Result<(), SplitError> {
        self.open_if_needed()?;
        let chunk = self.current.as_mut().expect("chunk open");
        chunk.writer.write_all(bytes)?;
        chunk.bytes += bytes.len() as u64;
        Ok(())
    }

    /// Copy a byte span of the input into the chunk in progress through a
    /// seekable second read handle, without materializing it in memory.
    pub(crate) fn copy_span(&mut self, src: &mut File, span: ByteSpan) -> Result<(), SplitError> {
        self.open_if_needed()?;
        let chunk = self.current.as_mut().expect("chunk open");
        src.seek(SeekFrom::Start(span.start))?;
        let copied = io::copy(&mut src.take(span.len), &mut chunk.writer)?;
        if copied != span.len {
            return Err(SplitError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input file shrank while splitting",
            )));
        }
        chunk.bytes += copied;
        Ok(())
    }

    /// Mark the chunk in progress as carrying a duplicated header line
    pub(crate) fn mark_duplicated_header(&mut self) {
        if let Some(chunk) = self.current.as_mut() {
            chunk.duplicated_header = true;
        }
    }

    /// Close the chunk in progress and make it visible: manifest row first,
    /// then the callback, in ascending ordinal order.
    pub(crate) fn flush_chunk(&mut self) -> Result<(), SplitError> {
        let Some(mut chunk) = self.current.take() else {
            return Ok(());
        };
        chunk.writer.flush()?;
        drop(chunk.writer);
        info!(chunk = %chunk.name, bytes = chunk.bytes, "chunk generated");
        self.manifest
            .append(&chunk.name, chunk.bytes, chunk.duplicated_header)?;
        (self.on_chunk)(&chunk.path, chunk.bytes);
        self.flushed += 1;
        Ok(())
    }

    /// Remove an unflushed chunk in progress from disk. Its ordinal is not
    /// reused.
    pub(crate) fn discard_current(&mut self) -> Result<(), SplitError> {
        if let Some(chunk) = self.current.take() {
            drop(chunk.writer);
            fs::remove_file(&chunk.path)?;
        }
        Ok(())
    }

    /// Finalize the manifest and return the number of flushed chunks. Any
    /// chunk still in progress must have been flushed or discarded first.
    pub(crate) fn finish(mut self) -> Result<u32, SplitError> {
        debug_assert!(self.current.is_none());
        self.discard_current()?;
        self.manifest.finish()?;
        Ok(self.flushed)
    }

    fn open_if_needed(&mut self) -> Result<(), SplitError> {
        if self.current.is_some() {
            return Ok(());
        }
        let name = self.namer.chunk_name(self.next_ordinal);
        let path = self.output_dir.join(&name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        self.next_ordinal += 1;
        self.current = Some(OpenChunk {
            writer: BufWriter::new(file),
            path,
            name,
            bytes: 0,
            duplicated_header: false,
        });
        Ok(())
    }
}
