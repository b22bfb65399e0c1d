//! In-memory stand-in for a lockbox
//!
//! `RecordingInstrument` keeps every command it is given, in order, and
//! answers queries from a table of canned replies. It is what the command
//! wrappers and the gain sequence are tested against, and is handy for
//! dry-running a sequence without hardware.

use std::collections::HashMap;

use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;

/// One interaction seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    Send(String),
    Query(String),
}

impl Exchange {
    pub fn command(&self) -> &str {
        match self {
            Exchange::Send(command) | Exchange::Query(command) => command,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingInstrument {
    exchanges: Vec<Exchange>,
    replies: HashMap<String, String>,
    default_reply: Option<String>,
    fail_on: Option<String>,
}

impl RecordingInstrument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` whenever exactly `query` is asked.
    pub fn with_reply(mut self, query: &str, reply: &str) -> Self {
        self.replies.insert(query.to_string(), reply.to_string());
        self
    }

    /// Reply with `reply` to any query without a specific entry.
    pub fn with_default_reply(mut self, reply: &str) -> Self {
        self.default_reply = Some(reply.to_string());
        self
    }

    /// Fail with `ConnectionClosed` once `command` is issued. The command is still recorded.
    pub fn failing_on(mut self, command: &str) -> Self {
        self.fail_on = Some(command.to_string());
        self
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Commands in the order they were issued, sends and queries alike
    pub fn commands(&self) -> Vec<&str> {
        self.exchanges.iter().map(Exchange::command).collect()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    fn check_failure(&self, command: &str) -> Result<(), LockboxError> {
        match &self.fail_on {
            Some(fail_on) if fail_on == command => Err(LockboxError::ConnectionClosed),
            _ => Ok(()),
        }
    }
}

impl ScpiInterface for RecordingInstrument {
    fn send(&mut self, command: &str) -> Result<(), LockboxError> {
        self.exchanges.push(Exchange::Send(command.to_string()));
        self.check_failure(command)
    }

    fn query(&mut self, command: &str) -> Result<String, LockboxError> {
        self.exchanges.push(Exchange::Query(command.to_string()));
        self.check_failure(command)?;

        self.replies
            .get(command)
            .or(self.default_reply.as_ref())
            .cloned()
            .ok_or_else(|| LockboxError::Protocol(format!("No reply scripted for '{command}'")))
    }
}
