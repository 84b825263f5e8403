use super::SplitError;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
struct ManifestRecord<'a> {
    filename: &'a str,
    filesize: u64,
    header: bool,
}

/// Append-only audit file listing each flushed chunk, one CSV row per chunk
/// with columns `filename,filesize,header`. Created at run start, scoped to
/// one output directory, never read back by the splitters.
pub struct ManifestWriter {
    writer: csv::Writer<File>,
}

impl ManifestWriter {
    pub fn create(output_dir: &Path, name: &str) -> Result<Self, SplitError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(output_dir.join(name))?;
        writer.write_record(["filename", "filesize", "header"])?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Append one row and flush it, so rows already written survive a later
    /// abort of the run.
    pub fn append(&mut self, filename: &str, filesize: u64, header: bool) -> Result<(), SplitError> {
        self.writer.serialize(ManifestRecord {
            filename,
            filesize,
            header,
        })?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), SplitError> {
        self.writer.flush()?;
        Ok(())
    }
}
