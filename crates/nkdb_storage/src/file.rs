//! Delimited text file backend for persistent storage.

use crate::backend::{Dataset, Record, StorageBackend};
use crate::error::StorageResult;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A CSV file storage backend.
///
/// Each record is one line of comma-separated fields. There is no header
/// row and lines may carry different numbers of fields.
///
/// A record with no fields has no line of its own and is not written.
///
/// # Durability
///
/// `save` truncates the file, writes every record and calls
/// `File::sync_all()` before returning. A crash in the middle of a save
/// can leave a partially written file.
///
/// # Example
///
/// ```no_run
/// use nkdb_storage::{StorageBackend, CsvBackend};
/// use std::path::Path;
///
/// let backend = CsvBackend::new(Path::new("data.csv"));
/// backend.save(&[vec!["a".to_string(), "1".to_string()]]).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CsvBackend {
    path: PathBuf,
    create_dirs: bool,
}

impl CsvBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// The file is not touched until the first `load` or `save`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            create_dirs: false,
        }
    }

    /// Creates a backend that creates missing parent directories on save.
    #[must_use]
    pub fn with_create_dirs(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            create_dirs: true,
        }
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create(&self) -> io::Result<File> {
        let open = || {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
        };

        match open() {
            Err(e) if e.kind() == io::ErrorKind::NotFound && self.create_dirs => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                open()
            }
            other => other,
        }
    }
}

impl StorageBackend for CsvBackend {
    fn load(&self) -> StorageResult<Dataset> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "no data file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(row.iter().map(str::to_string).collect());
        }

        debug!(path = %self.path.display(), records = records.len(), "loaded dataset");
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        let file = self.create()?;

        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_writer(&file);
            for record in records.iter().filter(|record| !record.is_empty()) {
                writer.write_record(record)?;
            }
            writer.flush()?;
        }

        (&file).flush()?;
        file.sync_all()?;

        debug!(path = %self.path.display(), records = records.len(), "saved dataset");
        Ok(())
    }
}
