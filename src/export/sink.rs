// src/export/sink.rs

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

/// What was handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub file_name: String,
    pub size_bytes: u64,
    /// Where it landed, if the sink writes to disk.
    pub location: Option<PathBuf>,
}

/// Stand-in for the browser/OS download mechanism.
///
/// `deliver` receives the complete payload; implementations must either
/// deliver all of it or nothing.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, file_name: &str, contents: &[u8]) -> io::Result<DeliveredFile>;
}

/// Writes exports into a directory, replacing any previous file of the same name.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DeliverySink for FileSink {
    fn deliver(&self, file_name: &str, contents: &[u8]) -> io::Result<DeliveredFile> {
        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(file_name);

        // Temp file in the same directory so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        debug!(path = %dest.display(), bytes = contents.len(), "export written");

        Ok(DeliveredFile {
            file_name: file_name.to_string(),
            size_bytes: contents.len() as u64,
            location: Some(dest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_writes_and_replaces() {
        let tmp = tempdir().unwrap();
        let sink = FileSink::new(tmp.path().join("downloads"));

        let first = sink.deliver("predictions.csv", b"a,prediction\n1,0\n").unwrap();
        assert_eq!(first.size_bytes, 17);
        let path = first.location.unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a,prediction\n1,0\n");

        sink.deliver("predictions.csv", b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");

        // No stray temp files left behind.
        let names: Vec<_> = fs::read_dir(sink.dir()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }
}
