use super::Lockbox;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;
use crate::types::OutputChannel;

impl<I: ScpiInterface> Lockbox<I> {
    /// Clamp the lower end of a fast output, in V.
    pub fn set_output_minimum(&mut self, output: OutputChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("OUT{}:LIM:MIN", output.index()), volts)
    }

    pub fn output_minimum(&mut self, output: OutputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("OUT{}:LIM:MIN", output.index()))
    }

    /// Clamp the upper end of a fast output, in V.
    pub fn set_output_maximum(&mut self, output: OutputChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("OUT{}:LIM:MAX", output.index()), volts)
    }

    pub fn output_maximum(&mut self, output: OutputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("OUT{}:LIM:MAX", output.index()))
    }
}
