//! Plain append-only file output.
//!
//! Lines go through a `tracing-appender` file appender with rotation
//! disabled, so the file lives at `<dir>/<file_name>` for the whole
//! session. The directory is created on open.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use super::layout::format_line;
use super::Sink;
use crate::error::SinkError;
use crate::record::LogRecord;

/// Appends formatted lines to a file inside a log directory.
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Mutex<RollingFileAppender>,
}

impl FileSink {
    /// Open (or create) `<dir>/<file_name>` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened.
    pub fn open(dir: impl AsRef<Path>, file_name: &str) -> Result<Self, SinkError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let builder = RollingFileAppender::builder().rotation(Rotation::NEVER);
        let builder = match file_name.rsplit_once('.') {
            Some((prefix, suffix)) if !prefix.is_empty() => {
                builder.filename_prefix(prefix).filename_suffix(suffix)
            }
            _ => builder.filename_prefix(file_name),
        };
        let appender = builder
            .build(dir)
            .map_err(|e| SinkError::Init(e.to_string()))?;

        Ok(Self {
            name: format!("file:{}", dir.join(file_name).display()),
            path: dir.join(file_name),
            writer: Mutex::new(appender),
        })
    }

    /// Full path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = format_line(record);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use std::sync::Arc;

    #[test]
    fn test_creates_directory_and_appends() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logsCalculadora");

        let sink = FileSink::open(&log_dir, "calculator.log").unwrap();
        assert!(log_dir.exists(), "log directory should be created");
        assert_eq!(sink.path(), log_dir.join("calculator.log"));

        let first = LogRecord::new(Severity::Info, Arc::from("calculator"), "first");
        let second = LogRecord::new(Severity::Error, Arc::from("calculator"), "second");
        sink.write(&first).unwrap();
        sink.write(&second).unwrap();
        sink.flush().unwrap();

        let contents = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO  calculator - first"));
        assert!(lines[1].ends_with("ERROR calculator - second"));
    }

    #[test]
    fn test_reopen_appends() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let record = LogRecord::new(Severity::Warn, Arc::from("student"), "again");

        for _ in 0..2 {
            let sink = FileSink::open(temp_dir.path(), "student.log").unwrap();
            sink.write(&record).unwrap();
            sink.flush().unwrap();
        }

        let contents = fs::read_to_string(temp_dir.path().join("student.log")).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_file_name_without_extension() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let sink = FileSink::open(temp_dir.path(), "audit").unwrap();
        let record = LogRecord::new(Severity::Info, Arc::from("auth"), "x");
        sink.write(&record).unwrap();
        sink.flush().unwrap();
        assert!(temp_dir.path().join("audit").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_directory_is_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let result = FileSink::open(blocker.join("logs"), "app.log");
        assert!(result.is_err(), "opening below a regular file should fail");
    }
}
