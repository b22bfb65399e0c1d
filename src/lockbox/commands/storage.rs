use super::Lockbox;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;

impl<I: ScpiInterface> Lockbox<I> {
    /// Save the lockbox configuration to the SD card.
    pub fn save_lockbox_config(&mut self) -> Result<(), LockboxError> {
        self.send_raw("LOCK:CONF:SAVE")
    }

    /// Load the lockbox configuration from the SD card.
    pub fn load_lockbox_config(&mut self) -> Result<(), LockboxError> {
        self.send_raw("LOCK:CONF:LOAD")
    }
}

#[cfg(test)]
mod tests {
    use crate::lockbox::commands::Lockbox;
    use crate::lockbox::mock::RecordingInstrument;

    #[test]
    fn test_config_storage_commands() {
        let mut lockbox = Lockbox::new(RecordingInstrument::new());
        lockbox.save_lockbox_config().unwrap();
        lockbox.load_lockbox_config().unwrap();
        assert_eq!(
            lockbox.interface().commands(),
            vec!["LOCK:CONF:SAVE", "LOCK:CONF:LOAD"]
        );
    }
}
