//! ## Size-bounded rotating log file
//!
//! [`RotatingWriter`] drives a [`file_rotate::FileRotate`] over a single log file. Once the
//! active file has grown past the size limit, the next record first moves it aside to a
//! backup named `<file>.<local timestamp>` (for example `app.log.20240501T102030`) and a
//! fresh file takes its place. Records are never split across files.
//!
//! Backups beyond the configured count and backups older than the configured age are removed
//! when the file is first opened and again after every rotation.
//!
//! The file is opened lazily on the first write, so building a writer never touches the disk.

use chrono::Duration as ChronoDuration;
use file_rotate::compression::Compression;
use file_rotate::suffix::{AppendTimestamp, DateFrom, FileLimit, SuffixScheme};
use file_rotate::{ContentLimit, FileRotate};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Local-time layout of the suffix appended to backup files.
pub const BACKUP_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// A log file that rotates by size and prunes old backups by count and age.
pub struct RotatingWriter {
    path: PathBuf,
    max_size: u64,
    max_backups: usize,
    max_age_days: u64,
    file: Option<FileRotate<AppendTimestamp>>,
    backups: Vec<PathBuf>,
}

impl fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("path", &self.path)
            .field("max_size", &self.max_size)
            .field("max_backups", &self.max_backups)
            .field("max_age_days", &self.max_age_days)
            .field("open", &self.file.is_some())
            .finish()
    }
}

impl RotatingWriter {
    /// Creates a writer for `path`.
    ///
    /// `max_size` is in bytes and `0` disables size rotation. `max_backups == 0` keeps every
    /// backup, and `max_age_days == 0` disables age-based removal.
    pub fn new(
        path: impl Into<PathBuf>,
        max_size: u64,
        max_backups: usize,
        max_age_days: u64,
    ) -> Self {
        Self {
            path: path.into(),
            max_size,
            max_backups,
            max_age_days,
            file: None,
            backups: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn max_age(&self) -> Option<ChronoDuration> {
        if self.max_age_days == 0 {
            return None;
        }
        i64::try_from(self.max_age_days)
            .ok()
            .and_then(ChronoDuration::try_days)
    }

    fn content_limit(&self) -> ContentLimit {
        match self.max_size {
            0 => ContentLimit::None,
            size => ContentLimit::BytesSurpassed(usize::try_from(size).unwrap_or(usize::MAX)),
        }
    }

    // file-rotate enforces one limit per rotation; the count wins and the age is applied by
    // `remove_stale_backups`.
    fn file_limit(&self) -> FileLimit {
        match (self.max_backups, self.max_age()) {
            (0, Some(age)) => FileLimit::Age(age),
            (0, None) => FileLimit::Unlimited,
            (count, _) => FileLimit::MaxFiles(count),
        }
    }

    fn suffix_scheme(limit: FileLimit) -> AppendTimestamp {
        AppendTimestamp::with_format(BACKUP_TIME_FORMAT, limit, DateFrom::Now)
    }

    fn open(&self) -> FileRotate<AppendTimestamp> {
        FileRotate::new(
            &self.path,
            Self::suffix_scheme(self.file_limit()),
            self.content_limit(),
            Compression::None,
            #[cfg(unix)]
            None,
        )
    }

    fn active_file(&mut self) -> io::Result<&mut FileRotate<AppendTimestamp>> {
        if self.file.is_none() {
            if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            self.remove_stale_backups()?;
            let mut file = self.open();
            self.backups = file.log_paths();
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "log file is not open"))
    }

    /// Removes backups beyond the count limit and backups older than the age limit. Returns how
    /// many files were removed.
    fn remove_stale_backups(&self) -> io::Result<usize> {
        let mut schemes = Vec::with_capacity(2);
        if self.max_backups > 0 {
            schemes.push(Self::suffix_scheme(FileLimit::MaxFiles(self.max_backups)));
        }
        if let Some(age) = self.max_age() {
            schemes.push(Self::suffix_scheme(FileLimit::Age(age)));
        }

        let mut removed = 0;
        for scheme in schemes {
            // Newest backup first, so the index is the backup's rank by age.
            for (index, info) in scheme.scan_suffixes(&self.path).iter().enumerate() {
                if scheme.too_old(&info.suffix, index) {
                    match fs::remove_file(info.to_path(&self.path)) {
                        Ok(()) => removed += 1,
                        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                        Err(err) => return Err(err),
                    }
                }
            }
        }
        Ok(removed)
    }

    fn after_write(&mut self) -> io::Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        let backups = file.log_paths();
        if backups == self.backups {
            return Ok(());
        }

        if self.remove_stale_backups()? > 0 {
            // Reopen so the backup list file-rotate keeps matches the directory again.
            self.file = None;
            let mut file = self.open();
            self.backups = file.log_paths();
            self.file = Some(file);
        } else {
            self.backups = backups;
        }
        Ok(())
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.active_file()?.write(buf)?;
        self.after_write()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// A cloneable, thread-safe handle to a [`RotatingWriter`], usable as a `tracing` writer.
#[derive(Debug, Clone)]
pub struct RotatingFile {
    inner: Arc<Mutex<RotatingWriter>>,
}

impl RotatingFile {
    pub fn new(writer: RotatingWriter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.inner.lock().path().to_path_buf()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// Exclusive access to the shared writer for the duration of one record.
pub struct RotatingFileGuard<'a>(MutexGuard<'a, RotatingWriter>);

impl Write for RotatingFileGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = RotatingFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingFileGuard(self.inner.lock())
    }
}
