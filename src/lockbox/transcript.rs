//! Command transcripts
//!
//! [`TranscriptInterface`] wraps any [`ScpiInterface`] and records every
//! command and reply, with a UTC timestamp, into a JSONL [`Logger`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;
use crate::logger::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub text: String,
}

impl TranscriptEntry {
    fn now(direction: Direction, text: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            direction,
            text: text.to_string(),
        }
    }
}

pub struct TranscriptInterface<I: ScpiInterface> {
    inner: I,
    logger: Logger<TranscriptEntry>,
}

impl<I: ScpiInterface> TranscriptInterface<I> {
    pub fn new(inner: I, logger: Logger<TranscriptEntry>) -> Self {
        Self { inner, logger }
    }

    pub fn path(&self) -> &Path {
        self.logger.path()
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.inner
    }

    /// Flush outstanding entries and return the wrapped interface.
    pub fn finish(mut self) -> Result<I, LockboxError> {
        self.logger.flush()?;
        self.logger.finalize_as_json()?;
        Ok(self.inner)
    }
}

impl<I: ScpiInterface> ScpiInterface for TranscriptInterface<I> {
    fn send(&mut self, command: &str) -> Result<(), LockboxError> {
        self.logger.add(TranscriptEntry::now(Direction::Tx, command))?;
        self.inner.send(command)
    }

    fn query(&mut self, command: &str) -> Result<String, LockboxError> {
        self.logger.add(TranscriptEntry::now(Direction::Tx, command))?;
        let reply = self.inner.query(command)?;
        self.logger.add(TranscriptEntry::now(Direction::Rx, &reply))?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockbox::mock::RecordingInstrument;

    #[test]
    fn test_transcript_records_tx_and_rx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript");

        let mock = RecordingInstrument::new().with_reply("PID:IN1:OUT1:KP?", "4096");
        let mut transcript = TranscriptInterface::new(mock, Logger::new(&path, 16, false));

        transcript.send("PID:IN1:OUT1:KP 4096").unwrap();
        assert_eq!(transcript.query("PID:IN1:OUT1:KP?").unwrap(), "4096");

        let file = transcript.path().to_path_buf();
        let mock = transcript.finish().unwrap();
        assert_eq!(mock.commands(), vec!["PID:IN1:OUT1:KP 4096", "PID:IN1:OUT1:KP?"]);

        let entries: Vec<TranscriptEntry> = std::fs::read_to_string(&file)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let summary: Vec<(Direction, &str)> = entries
            .iter()
            .map(|e| (e.direction, e.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Direction::Tx, "PID:IN1:OUT1:KP 4096"),
                (Direction::Tx, "PID:IN1:OUT1:KP?"),
                (Direction::Rx, "4096"),
            ]
        );
    }
}
