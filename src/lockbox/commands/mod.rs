use std::time::Duration;

use super::client::LockboxClient;
use super::interface::ScpiInterface;
use super::protocol::Protocol;
use crate::error::LockboxError;

pub mod analog;
pub mod generator;
pub mod output;
pub mod pid;
pub mod relock;
pub mod storage;

/// Typed command set of the Red Pitaya lockbox.
///
/// `Lockbox` turns method calls into SCPI command text and parses the
/// replies. It is generic over the [`ScpiInterface`] carrying the text, so the
/// same code drives real hardware through [`LockboxClient`] and a
/// [`RecordingInstrument`](crate::RecordingInstrument) in tests.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use rp_lockbox::{Lockbox, PidChannel, PidGain};
///
/// let mut lockbox = Lockbox::connect("192.168.50.37", Some(Duration::from_secs(5)))?;
/// let pid = PidChannel::new(1, 1)?;
///
/// lockbox.set_gain(pid, PidGain::Kp, 4096.0)?;
/// println!("KP = {}", lockbox.gain(pid, PidGain::Kp)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Lockbox<I: ScpiInterface> {
    interface: I,
}

impl Lockbox<LockboxClient> {
    /// Connect to `host` on the default port with one timeout for all phases
    pub fn connect(host: &str, timeout: Option<Duration>) -> Result<Self, LockboxError> {
        Ok(Self::new(LockboxClient::new(host, timeout)?))
    }
}

impl<I: ScpiInterface> Lockbox<I> {
    pub fn new(interface: I) -> Self {
        Self { interface }
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    pub fn into_inner(self) -> I {
        self.interface
    }

    /// Send raw command text
    pub fn send_raw(&mut self, command: &str) -> Result<(), LockboxError> {
        self.interface.send(command)
    }

    /// Send a raw query and return the unparsed reply
    pub fn query_raw(&mut self, command: &str) -> Result<String, LockboxError> {
        self.interface.query(command)
    }

    pub(crate) fn set_number(&mut self, command: &str, value: f64) -> Result<(), LockboxError> {
        let value = Protocol::format_number(value)?;
        self.interface.send(&format!("{command} {value}"))
    }

    pub(crate) fn set_flag(&mut self, command: &str, state: bool) -> Result<(), LockboxError> {
        self.interface
            .send(&format!("{command} {}", Protocol::format_bool(state)))
    }

    pub(crate) fn query_number(&mut self, command: &str) -> Result<f64, LockboxError> {
        let query = format!("{command}?");
        let response = self.interface.query(&query)?;
        Protocol::parse_float(&query, &response)
    }

    pub(crate) fn query_on_off(&mut self, command: &str) -> Result<bool, LockboxError> {
        let query = format!("{command}?");
        let response = self.interface.query(&query)?;
        Protocol::parse_on_off(&query, &response)
    }
}
