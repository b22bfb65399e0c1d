use super::Lockbox;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;
use crate::lockbox::protocol::Protocol;
use crate::types::{AnalogPin, InputChannel, OutputChannel};

impl<I: ScpiInterface> Lockbox<I> {
    /// Reset all slow analog outputs to 0 V.
    pub fn analog_reset(&mut self) -> Result<(), LockboxError> {
        self.send_raw("ANALOG:RST")
    }

    /// Drive a slow analog output pin.
    ///
    /// # Arguments
    /// * `pin` - One of `AOUT0` to `AOUT3`
    /// * `volts` - Output voltage
    ///
    /// # Errors
    /// Returns `LockboxError::InvalidValue` for input pins without sending anything.
    pub fn set_analog_pin(&mut self, pin: AnalogPin, volts: f64) -> Result<(), LockboxError> {
        if pin.is_input() {
            return Err(LockboxError::InvalidValue(format!(
                "{pin} is an input and cannot be driven"
            )));
        }
        let value = Protocol::format_number(volts)?;
        self.send_raw(&format!("ANALOG:PIN {},{value}", pin.name()))
    }

    /// Read the voltage of any slow analog pin.
    pub fn analog_pin(&mut self, pin: AnalogPin) -> Result<f64, LockboxError> {
        let query = format!("ANALOG:PIN? {}", pin.name());
        let response = self.query_raw(&query)?;
        Protocol::parse_float(&query, &response)
    }

    /// Voltage currently seen on a fast input
    pub fn input_voltage(&mut self, input: InputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("ANALOG:IN{}:VOLT", input.index()))
    }

    /// Voltage currently driven on a fast output
    pub fn output_voltage(&mut self, output: OutputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("ANALOG:OUT{}:VOLT", output.index()))
    }
}
