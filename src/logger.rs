use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    ffi::OsStr,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::LockboxError;

/// Buffered JSON-lines writer.
///
/// Records are kept in memory and appended to the file once `buffer_size`
/// of them have accumulated, on [`flush`](Logger::flush), and on drop. With
/// `final_format_json` the JSONL file is rewritten as a pretty JSON array
/// when the logger is finalised.
///
/// Writing failures are counted rather than raised, so a full disk does not
/// abort a running sequence; after `max_flush_failures` consecutive failures
/// the error is returned.
#[derive(Debug)]
pub struct Logger<T>
where
    T: Serialize + DeserializeOwned,
{
    buffer: Vec<T>,
    buffer_size: usize,
    file_path: PathBuf,
    final_format_json: bool,
    finalized: bool,
    flush_failures: usize,
    max_flush_failures: usize,
}

impl<T> Logger<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(file_path: P, buffer_size: usize, final_format_json: bool) -> Self {
        let mut path = file_path.into();

        let extension = if final_format_json { "json" } else { "jsonl" };
        if path.extension() != Some(OsStr::new(extension)) {
            path.set_extension(extension);
        }

        Self {
            buffer: Vec::with_capacity(buffer_size),
            buffer_size: buffer_size.max(1),
            file_path: path,
            final_format_json,
            finalized: false,
            flush_failures: 0,
            max_flush_failures: 10,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn add(&mut self, data: T) -> Result<(), LockboxError> {
        self.buffer.push(data);

        if self.buffer.len() >= self.buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Append buffered records to the file as JSON lines.
    pub fn flush(&mut self) -> Result<(), LockboxError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        match self.write_buffer() {
            Ok(()) => {
                self.flush_failures = 0;
                self.buffer.clear();
                info!("Logger flushed to {:?}", self.file_path);
                Ok(())
            }
            Err(e) => {
                self.flush_failures += 1;
                log::error!(
                    "Flush failure {}/{}: {}",
                    self.flush_failures,
                    self.max_flush_failures,
                    e
                );

                if self.flush_failures % 3 == 0 {
                    warn!(
                        "Experiencing intermittent flush failures ({}/{})",
                        self.flush_failures, self.max_flush_failures
                    );
                }

                if self.flush_failures >= self.max_flush_failures {
                    return Err(LockboxError::Io {
                        source: std::io::Error::other(e.to_string()),
                        context: format!(
                            "Too many consecutive flush failures ({}) for {:?}",
                            self.max_flush_failures, self.file_path
                        ),
                    });
                }

                Ok(())
            }
        }
    }

    fn write_buffer(&self) -> Result<(), LockboxError> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(|source| LockboxError::Io {
                source,
                context: format!("Could not open log file {:?}", self.file_path),
            })?;

        let mut writer = BufWriter::new(file);
        for data in &self.buffer {
            serde_json::to_writer(&mut writer, data)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Convert the JSONL file to a JSON array. Only done once, and only when
    /// the logger was created with `final_format_json`.
    pub fn finalize_as_json(&mut self) -> Result<(), LockboxError> {
        if !self.final_format_json || self.finalized {
            return Ok(());
        }

        self.flush()?;

        let content = match std::fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            // Nothing was ever written
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.finalized = true;
                return Ok(());
            }
            Err(source) => {
                return Err(LockboxError::Io {
                    source,
                    context: format!("Could not read JSONL file at {:?}", self.file_path),
                });
            }
        };

        let entries = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<T>(line))
            .collect::<Result<Vec<_>, _>>()?;

        let json_output = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.file_path, json_output).map_err(|source| LockboxError::Io {
            source,
            context: format!("Could not write JSON file at {:?}", self.file_path),
        })?;

        self.finalized = true;
        info!("Converted {} entries from JSONL to JSON format", entries.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl<T> Drop for Logger<T>
where
    T: Serialize + DeserializeOwned,
{
    fn drop(&mut self) {
        let _ = self.flush();
        let _ = self.finalize_as_json();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        n: u32,
    }

    #[test]
    fn test_extension_follows_format() {
        let dir = tempfile::tempdir().unwrap();
        let jsonl: Logger<Sample> = Logger::new(dir.path().join("run.txt"), 4, false);
        let json: Logger<Sample> = Logger::new(dir.path().join("run"), 4, true);
        assert_eq!(jsonl.path(), dir.path().join("run.jsonl"));
        assert_eq!(json.path(), dir.path().join("run.json"));
    }

    #[test]
    fn test_flushes_when_buffer_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = Logger::new(dir.path().join("full"), 2, false);

        logger.add(Sample { n: 1 }).unwrap();
        assert_eq!(logger.len(), 1);
        logger.add(Sample { n: 2 }).unwrap();
        assert!(logger.is_empty());

        let content = std::fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content, "{\"n\":1}\n{\"n\":2}\n");
    }

    #[test]
    fn test_finalize_writes_json_array_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = Logger::new(dir.path().join("array"), 10, true);
        logger.add(Sample { n: 7 }).unwrap();
        logger.add(Sample { n: 8 }).unwrap();

        logger.finalize_as_json().unwrap();
        logger.finalize_as_json().unwrap();

        let content = std::fs::read_to_string(logger.path()).unwrap();
        let parsed: Vec<Sample> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![Sample { n: 7 }, Sample { n: 8 }]);
    }

    #[test]
    fn test_flush_failures_tolerated_up_to_limit() {
        // A regular file where the parent directory should be
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let mut logger = Logger::new(blocker.path().join("log"), 100, false);
        logger.add(Sample { n: 1 }).unwrap();

        for attempt in 1..logger.max_flush_failures {
            assert!(logger.flush().is_ok(), "flush {attempt} reported early");
            assert_eq!(logger.len(), 1);
            assert_eq!(logger.flush_failures, attempt);
        }

        assert!(matches!(logger.flush(), Err(LockboxError::Io { .. })));
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn test_successful_flush_resets_failure_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = Logger::new(dir.path().join("reset"), 100, false);
        logger.add(Sample { n: 1 }).unwrap();
        logger.flush_failures = 4;

        logger.flush().unwrap();
        assert_eq!(logger.flush_failures, 0);
        assert!(logger.is_empty());
    }
}
