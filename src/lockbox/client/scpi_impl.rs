use super::LockboxClient;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;

/// Implementation of ScpiInterface for LockboxClient
///
/// Forwards to the delimiter-handling `tx_txt`/`txrx_txt` methods.
impl ScpiInterface for LockboxClient {
    fn send(&mut self, command: &str) -> Result<(), LockboxError> {
        self.tx_txt(command)
    }

    fn query(&mut self, command: &str) -> Result<String, LockboxError> {
        self.txrx_txt(command)
    }
}
