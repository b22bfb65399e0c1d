use super::Lockbox;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;
use crate::types::{AnalogPin, PidChannel};

impl<I: ScpiInterface> Lockbox<I> {
    /// Enable or disable the relock routine of a PID.
    ///
    /// While enabled the device watches the relock input. When it leaves the
    /// window set by [`set_relock_minimum`](Self::set_relock_minimum) and
    /// [`set_relock_maximum`](Self::set_relock_maximum), the integrator is
    /// frozen and the output is ramped at the relock step size until the
    /// input is back inside, then the integrator is released.
    pub fn set_relock_state(&mut self, channel: PidChannel, state: bool) -> Result<(), LockboxError> {
        self.set_flag(&format!("{}:REL", channel.prefix()), state)
    }

    pub fn relock_state(&mut self, channel: PidChannel) -> Result<bool, LockboxError> {
        self.query_on_off(&format!("{}:REL", channel.prefix()))
    }

    /// Slew rate of the relock ramp in V/s
    pub fn set_relock_stepsize(
        &mut self,
        channel: PidChannel,
        volts_per_second: f64,
    ) -> Result<(), LockboxError> {
        self.set_number(&format!("{}:REL:STEP", channel.prefix()), volts_per_second)
    }

    pub fn relock_stepsize(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("{}:REL:STEP", channel.prefix()))
    }

    /// Lowest relock input voltage still considered locked
    pub fn set_relock_minimum(&mut self, channel: PidChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("{}:REL:MIN", channel.prefix()), volts)
    }

    pub fn relock_minimum(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("{}:REL:MIN", channel.prefix()))
    }

    /// Highest relock input voltage still considered locked
    pub fn set_relock_maximum(&mut self, channel: PidChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("{}:REL:MAX", channel.prefix()), volts)
    }

    pub fn relock_maximum(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("{}:REL:MAX", channel.prefix()))
    }

    /// Select the slow analog input monitored by the relock routine.
    ///
    /// Only `AIN0` to `AIN3` are accepted by the device.
    pub fn set_relock_input(&mut self, channel: PidChannel, pin: AnalogPin) -> Result<(), LockboxError> {
        if !pin.is_input() {
            return Err(LockboxError::InvalidValue(format!(
                "relock input must be an analog input, got {pin}"
            )));
        }
        self.send_raw(&format!("{}:REL:INP {}", channel.prefix(), pin.name()))
    }

    pub fn relock_input(&mut self, channel: PidChannel) -> Result<AnalogPin, LockboxError> {
        let query = format!("{}:REL:INP?", channel.prefix());
        let response = self.query_raw(&query)?;
        response.parse().map_err(|_| LockboxError::Parse {
            command: query,
            response,
        })
    }
}
