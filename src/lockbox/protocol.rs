use crate::error::LockboxError;
use log::debug;
use std::io::{ErrorKind, Read};
use std::time::Duration;

// Protocol constants
pub const DELIMITER: &str = "\r\n";
pub const DEFAULT_PORT: u16 = 5000;
pub const CHUNK_SIZE: usize = 4096;
pub const MAX_REPLY_SIZE: usize = 16 * 1024 * 1024;

/// Text framing and value encoding for the lockbox SCPI server
pub struct Protocol;

impl Protocol {
    /// Append the line delimiter to a command.
    pub fn frame(command: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(command.len() + DELIMITER.len());
        bytes.extend_from_slice(command.as_bytes());
        bytes.extend_from_slice(DELIMITER.as_bytes());
        bytes
    }

    /// Read one delimited reply from `reader` and return it without the delimiter.
    ///
    /// Data is pulled in chunks of `CHUNK_SIZE + 2` bytes until the accumulated
    /// bytes end with the delimiter. `timeout` is only used to describe a
    /// socket timeout in the returned error.
    pub fn read_reply(
        reader: &mut dyn Read,
        timeout: Option<Duration>,
    ) -> Result<String, LockboxError> {
        let mut message: Vec<u8> = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE + DELIMITER.len()];

        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => {
                    debug!("Peer closed after {} bytes of reply", message.len());
                    return Err(LockboxError::ConnectionClosed);
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(LockboxError::Timeout(timeout.unwrap_or_default()));
                }
                Err(e) => {
                    return Err(LockboxError::Io {
                        source: e,
                        context: "Reading reply".to_string(),
                    });
                }
            };

            message.extend_from_slice(&chunk[..n]);

            if message.ends_with(DELIMITER.as_bytes()) {
                break;
            }
            if message.len() > MAX_REPLY_SIZE {
                return Err(LockboxError::Protocol(format!(
                    "Reply exceeds {MAX_REPLY_SIZE} bytes without delimiter"
                )));
            }
        }

        message.truncate(message.len() - DELIMITER.len());
        String::from_utf8(message)
            .map_err(|_| LockboxError::Protocol("Invalid UTF-8 in reply".into()))
    }

    /// Format a numeric parameter the way the SCPI number parser expects it.
    ///
    /// Integral values are written without a fraction (`4096`), tiny or huge
    /// magnitudes in scientific notation (`1e-7`), everything else as the
    /// shortest decimal that round-trips.
    pub fn format_number(value: f64) -> Result<String, LockboxError> {
        if !value.is_finite() {
            return Err(LockboxError::InvalidValue(format!(
                "{value} cannot be sent to the lockbox"
            )));
        }
        if value == 0.0 {
            return Ok("0".to_string());
        }

        let magnitude = value.abs();
        let text = if value.fract() == 0.0 && magnitude < 1e15 {
            format!("{}", value as i64)
        } else if (1e-4..1e15).contains(&magnitude) {
            format!("{value}")
        } else {
            format!("{value:e}")
        };
        Ok(text)
    }

    pub fn format_bool(state: bool) -> &'static str {
        if state { "1" } else { "0" }
    }

    pub fn parse_float(command: &str, response: &str) -> Result<f64, LockboxError> {
        response
            .trim()
            .parse::<f64>()
            .map_err(|_| Self::parse_error(command, response))
    }

    /// Parse an `ON`/`OFF` mnemonic reply. Numeric `1`/`0` is accepted as well.
    pub fn parse_on_off(command: &str, response: &str) -> Result<bool, LockboxError> {
        match response.trim().to_ascii_uppercase().as_str() {
            "ON" | "1" => Ok(true),
            "OFF" | "0" => Ok(false),
            _ => Err(Self::parse_error(command, response)),
        }
    }

    /// Parse an integer reply where any non-zero value means enabled.
    pub fn parse_int_bool(command: &str, response: &str) -> Result<bool, LockboxError> {
        response
            .trim()
            .parse::<i64>()
            .map(|v| v != 0)
            .map_err(|_| Self::parse_error(command, response))
    }

    fn parse_error(command: &str, response: &str) -> LockboxError {
        LockboxError::Parse {
            command: command.to_string(),
            response: response.to_string(),
        }
    }
}
