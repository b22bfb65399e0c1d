use super::Lockbox;
use crate::error::LockboxError;
use crate::lockbox::interface::ScpiInterface;
use crate::types::{PidChannel, PidGain};

impl<I: ScpiInterface> Lockbox<I> {
    /// Set one gain of a PID controller.
    ///
    /// Sends `PID:IN<i>:OUT<o>:<gain> <value>`.
    ///
    /// # Arguments
    /// * `channel` - PID controller to address
    /// * `gain` - Which gain to write
    /// * `value` - New value, in the unit of the gain (see [`PidGain`])
    ///
    /// # Errors
    /// Returns `LockboxError` if the value is not finite or the command cannot be sent.
    ///
    /// # Examples
    /// ```no_run
    /// use std::time::Duration;
    /// use rp_lockbox::{Lockbox, PidChannel, PidGain};
    ///
    /// let mut lockbox = Lockbox::connect("192.168.50.37", Some(Duration::from_secs(5)))?;
    ///
    /// // 100 ns derivative gain on IN1 -> OUT1
    /// lockbox.set_gain(PidChannel::new(1, 1)?, PidGain::Kd, 1e-7)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn set_gain(
        &mut self,
        channel: PidChannel,
        gain: PidGain,
        value: f64,
    ) -> Result<(), LockboxError> {
        self.set_number(&gain_command(channel, gain), value)
    }

    /// Read back one gain of a PID controller as a number.
    pub fn gain(&mut self, channel: PidChannel, gain: PidGain) -> Result<f64, LockboxError> {
        self.query_number(&gain_command(channel, gain))
    }

    /// Read back one gain exactly as the device formats it.
    pub fn gain_raw(&mut self, channel: PidChannel, gain: PidGain) -> Result<String, LockboxError> {
        self.query_raw(&format!("{}?", gain_command(channel, gain)))
    }

    /// Set the global gain `Kg`.
    pub fn set_kg(&mut self, channel: PidChannel, gain: f64) -> Result<(), LockboxError> {
        self.set_gain(channel, PidGain::Kg, gain)
    }

    pub fn kg(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.gain(channel, PidGain::Kg)
    }

    /// Set the P gain (0 to 4096).
    pub fn set_kp(&mut self, channel: PidChannel, gain: f64) -> Result<(), LockboxError> {
        self.set_gain(channel, PidGain::Kp, gain)
    }

    pub fn kp(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.gain(channel, PidGain::Kp)
    }

    /// Set the I gain in 1/s. The unity gain frequency is `ki / 2π`.
    pub fn set_ki(&mut self, channel: PidChannel, gain: f64) -> Result<(), LockboxError> {
        self.set_gain(channel, PidGain::Ki, gain)
    }

    pub fn ki(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.gain(channel, PidGain::Ki)
    }

    /// Set the double-integrator gain in 1/s.
    pub fn set_kii(&mut self, channel: PidChannel, gain: f64) -> Result<(), LockboxError> {
        self.set_gain(channel, PidGain::Kii, gain)
    }

    pub fn kii(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.gain(channel, PidGain::Kii)
    }

    /// Set the D gain in s.
    pub fn set_kd(&mut self, channel: PidChannel, gain: f64) -> Result<(), LockboxError> {
        self.set_gain(channel, PidGain::Kd, gain)
    }

    pub fn kd(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.gain(channel, PidGain::Kd)
    }

    /// Set the PID setpoint in V.
    pub fn set_setpoint(&mut self, channel: PidChannel, volts: f64) -> Result<(), LockboxError> {
        self.set_number(&format!("{}:SETPoint", channel.prefix()), volts)
    }

    /// Get the PID setpoint in V.
    pub fn setpoint(&mut self, channel: PidChannel) -> Result<f64, LockboxError> {
        self.query_number(&format!("{}:SETPoint", channel.prefix()))
    }

    /// Hold the integrator register at zero while enabled.
    pub fn set_int_reset_state(
        &mut self,
        channel: PidChannel,
        state: bool,
    ) -> Result<(), LockboxError> {
        self.set_flag(&format!("{}:INT:RES", channel.prefix()), state)
    }

    pub fn int_reset_state(&mut self, channel: PidChannel) -> Result<bool, LockboxError> {
        self.query_on_off(&format!("{}:INT:RES", channel.prefix()))
    }

    /// Freeze the integrator register at its current value while enabled.
    pub fn set_int_hold_state(
        &mut self,
        channel: PidChannel,
        state: bool,
    ) -> Result<(), LockboxError> {
        self.set_flag(&format!("{}:INT:HOLD", channel.prefix()), state)
    }

    pub fn int_hold_state(&mut self, channel: PidChannel) -> Result<bool, LockboxError> {
        self.query_on_off(&format!("{}:INT:HOLD", channel.prefix()))
    }

    /// Reset the integrator automatically when the output hits a configured limit.
    pub fn set_int_auto_state(
        &mut self,
        channel: PidChannel,
        state: bool,
    ) -> Result<(), LockboxError> {
        self.set_flag(&format!("{}:INT:AUTO", channel.prefix()), state)
    }

    pub fn int_auto_state(&mut self, channel: PidChannel) -> Result<bool, LockboxError> {
        self.query_on_off(&format!("{}:INT:AUTO", channel.prefix()))
    }

    /// Invert the sign of the PID output.
    pub fn set_inv_state(&mut self, channel: PidChannel, state: bool) -> Result<(), LockboxError> {
        self.set_flag(&format!("{}:INV", channel.prefix()), state)
    }

    pub fn inv_state(&mut self, channel: PidChannel) -> Result<bool, LockboxError> {
        self.query_on_off(&format!("{}:INV", channel.prefix()))
    }
}

fn gain_command(channel: PidChannel, gain: PidGain) -> String {
    format!("{}:{}", channel.prefix(), gain.mnemonic())
}

#[cfg(test)]
mod tests {
    use crate::error::LockboxError;
    use crate::lockbox::commands::Lockbox;
    use crate::lockbox::mock::RecordingInstrument;
    use crate::types::{PidChannel, PidGain};

    #[test]
    fn test_gain_write_commands() {
        let mut lockbox = Lockbox::new(RecordingInstrument::new());
        let pid = PidChannel::new(1, 1).unwrap();

        lockbox.set_kg(pid, 4096.0).unwrap();
        lockbox.set_kp(pid, 4096.0).unwrap();
        lockbox.set_kd(pid, 1e-7).unwrap();
        lockbox.set_kii(pid, 1000.0).unwrap();
        lockbox.set_ki(pid, 12.5).unwrap();

        assert_eq!(
            lockbox.interface().commands(),
            vec![
                "PID:IN1:OUT1:Kg 4096",
                "PID:IN1:OUT1:KP 4096",
                "PID:IN1:OUT1:KD 1e-7",
                "PID:IN1:OUT1:KII 1000",
                "PID:IN1:OUT1:KI 12.5",
            ]
        );
    }

    #[test]
    fn test_gain_queries_parse_device_format() {
        let mock = RecordingInstrument::new()
            .with_reply("PID:IN2:OUT1:KD?", "1.000000e-07")
            .with_reply("PID:IN2:OUT1:KP?", "4096");
        let mut lockbox = Lockbox::new(mock);
        let pid = PidChannel::new(2, 1).unwrap();

        assert_eq!(lockbox.kd(pid).unwrap(), 1e-7);
        assert_eq!(lockbox.gain(pid, PidGain::Kp).unwrap(), 4096.0);
        assert_eq!(lockbox.gain_raw(pid, PidGain::Kd).unwrap(), "1.000000e-07");
    }

    #[test]
    fn test_unparseable_gain_reply() {
        let mock = RecordingInstrument::new().with_default_reply("ERR");
        let mut lockbox = Lockbox::new(mock);

        let result = lockbox.kii(PidChannel::default());
        assert!(matches!(
            result,
            Err(LockboxError::Parse { command, response })
                if command == "PID:IN1:OUT1:KII?" && response == "ERR"
        ));
    }

    #[test]
    fn test_non_finite_gain_is_not_sent() {
        let mut lockbox = Lockbox::new(RecordingInstrument::new());
        let result = lockbox.set_kp(PidChannel::default(), f64::NAN);

        assert!(matches!(result, Err(LockboxError::InvalidValue(_))));
        assert!(lockbox.interface().exchanges().is_empty());
    }

    #[test]
    fn test_integrator_flags() {
        let mock = RecordingInstrument::new()
            .with_reply("PID:IN1:OUT2:INT:HOLD?", "ON")
            .with_reply("PID:IN1:OUT2:INV?", "OFF");
        let mut lockbox = Lockbox::new(mock);
        let pid = PidChannel::new(1, 2).unwrap();

        lockbox.set_int_reset_state(pid, true).unwrap();
        lockbox.set_int_auto_state(pid, false).unwrap();
        assert!(lockbox.int_hold_state(pid).unwrap());
        assert!(!lockbox.inv_state(pid).unwrap());

        assert_eq!(
            lockbox.interface().commands(),
            vec![
                "PID:IN1:OUT2:INT:RES 1",
                "PID:IN1:OUT2:INT:AUTO 0",
                "PID:IN1:OUT2:INT:HOLD?",
                "PID:IN1:OUT2:INV?",
            ]
        );
    }

    #[test]
    fn test_setpoint() {
        let mock = RecordingInstrument::new().with_reply("PID:IN1:OUT1:SETPoint?", "-0.25");
        let mut lockbox = Lockbox::new(mock);

        lockbox.set_setpoint(PidChannel::default(), -0.25).unwrap();
        assert_eq!(lockbox.setpoint(PidChannel::default()).unwrap(), -0.25);
        assert_eq!(lockbox.interface().commands()[0], "PID:IN1:OUT1:SETPoint -0.25");
    }
}
