use crate::error::LockboxError;

/// Text command channel to an instrument speaking SCPI
///
/// This is the seam between the typed lockbox commands and whatever carries
/// the text: the TCP client for real hardware, a recording mock for tests,
/// or a wrapper that adds behaviour such as transcripts.
///
/// # Design Philosophy
/// - Commands are passed without their line delimiter; framing belongs to the transport
/// - `send` never waits for a reply, `query` always reads exactly one
/// - Enable testing through mock implementations
pub trait ScpiInterface {
    /// Transmit a command that produces no reply
    fn send(&mut self, command: &str) -> Result<(), LockboxError>;

    /// Transmit a query and return the reply text without its delimiter
    fn query(&mut self, command: &str) -> Result<String, LockboxError>;
}

impl<T: ScpiInterface + ?Sized> ScpiInterface for Box<T> {
    fn send(&mut self, command: &str) -> Result<(), LockboxError> {
        (**self).send(command)
    }

    fn query(&mut self, command: &str) -> Result<String, LockboxError> {
        (**self).query(command)
    }
}

impl<T: ScpiInterface + ?Sized> ScpiInterface for &mut T {
    fn send(&mut self, command: &str) -> Result<(), LockboxError> {
        (**self).send(command)
    }

    fn query(&mut self, command: &str) -> Result<String, LockboxError> {
        (**self).query(command)
    }
}
