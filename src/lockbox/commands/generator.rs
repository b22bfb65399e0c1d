use super::Lockbox;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;
use crate::lockbox::protocol::Protocol;
use crate::types::{OutputChannel, Waveform};

impl<I: ScpiInterface> Lockbox<I> {
    /// Enable or disable the signal generator on an output.
    pub fn set_output_state(&mut self, output: OutputChannel, state: bool) -> Result<(), LockboxError> {
        self.set_flag(&format!("OUTPUT{}:STATE", output.index()), state)
    }

    /// Whether the signal generator on an output is enabled.
    ///
    /// Unlike the PID flags this replies with `0`/`1`.
    pub fn output_state(&mut self, output: OutputChannel) -> Result<bool, LockboxError> {
        let query = format!("OUTPUT{}:STATE?", output.index());
        let response = self.query_raw(&query)?;
        Protocol::parse_int_bool(&query, &response)
    }

    /// Generator frequency in Hz
    pub fn set_generator_frequency(&mut self, output: OutputChannel, hertz: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("SOUR{}:FREQ:FIX", output.index()), hertz)
    }

    pub fn generator_frequency(&mut self, output: OutputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("SOUR{}:FREQ:FIX", output.index()))
    }

    pub fn set_generator_waveform(
        &mut self,
        output: OutputChannel,
        waveform: Waveform,
    ) -> Result<(), LockboxError> {
        self.send_raw(&format!("SOUR{}:FUNC {}", output.index(), waveform.name()))
    }

    pub fn generator_waveform(&mut self, output: OutputChannel) -> Result<Waveform, LockboxError> {
        let query = format!("SOUR{}:FUNC?", output.index());
        let response = self.query_raw(&query)?;
        response.parse().map_err(|_| LockboxError::Parse {
            command: query,
            response,
        })
    }

    /// Generator amplitude in V. Amplitude plus offset must stay within ±1 V.
    pub fn set_generator_amplitude(&mut self, output: OutputChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("SOUR{}:VOLT", output.index()), volts)
    }

    pub fn generator_amplitude(&mut self, output: OutputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("SOUR{}:VOLT", output.index()))
    }

    /// Generator offset in V. Amplitude plus offset must stay within ±1 V.
    pub fn set_generator_offset(&mut self, output: OutputChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("SOUR{}:VOLT:OFFS", output.index()), volts)
    }

    pub fn generator_offset(&mut self, output: OutputChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("SOUR{}:VOLT:OFFS", output.index()))
    }
}
