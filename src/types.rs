use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LockboxError;

/// One of the four PID controllers of the lockbox, addressed by the
/// input it reads and the output it drives.
///
/// The device maps `(in, out)` to its internal PID numbers as
/// `(1,1) -> PID11`, `(2,1) -> PID12`, `(1,2) -> PID21`, `(2,2) -> PID22`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PidChannel {
    input: u8,
    output: u8,
}

impl PidChannel {
    pub const IN1_OUT1: PidChannel = PidChannel { input: 1, output: 1 };

    pub fn new(input: u8, output: u8) -> Result<Self, LockboxError> {
        check_index("input", input)?;
        check_index("output", output)?;
        Ok(Self { input, output })
    }

    pub fn input(&self) -> u8 {
        self.input
    }

    pub fn output(&self) -> u8 {
        self.output
    }

    /// Command prefix addressing this controller, e.g. `PID:IN1:OUT2`
    pub fn prefix(&self) -> String {
        format!("PID:IN{}:OUT{}", self.input, self.output)
    }
}

impl Default for PidChannel {
    fn default() -> Self {
        Self::IN1_OUT1
    }
}

impl fmt::Display for PidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IN{}/OUT{}", self.input, self.output)
    }
}

/// Fast analog output (and signal generator) channel, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputChannel(u8);

impl OutputChannel {
    pub fn new(index: u8) -> Result<Self, LockboxError> {
        check_index("output", index)?;
        Ok(OutputChannel(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for OutputChannel {
    type Error = LockboxError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        OutputChannel::new(index)
    }
}

/// Fast analog input channel, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputChannel(u8);

impl InputChannel {
    pub fn new(index: u8) -> Result<Self, LockboxError> {
        check_index("input", index)?;
        Ok(InputChannel(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for InputChannel {
    type Error = LockboxError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        InputChannel::new(index)
    }
}

fn check_index(kind: &'static str, index: u8) -> Result<(), LockboxError> {
    if (1..=2).contains(&index) {
        Ok(())
    } else {
        Err(LockboxError::InvalidChannel { kind, index })
    }
}

/// Gain parameters of a lockbox PID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PidGain {
    /// Global gain
    #[serde(rename = "Kg")]
    Kg,
    /// Proportional gain (0 to 4096)
    #[serde(rename = "KP")]
    Kp,
    /// Integral gain in 1/s
    #[serde(rename = "KI")]
    Ki,
    /// Double integral gain in 1/s
    #[serde(rename = "KII")]
    Kii,
    /// Derivative gain in s
    #[serde(rename = "KD")]
    Kd,
}

impl PidGain {
    pub const ALL: [PidGain; 5] = [
        PidGain::Kg,
        PidGain::Kp,
        PidGain::Ki,
        PidGain::Kii,
        PidGain::Kd,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            PidGain::Kg => "Kg",
            PidGain::Kp => "KP",
            PidGain::Ki => "KI",
            PidGain::Kii => "KII",
            PidGain::Kd => "KD",
        }
    }
}

impl fmt::Display for PidGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for PidGain {
    type Err = LockboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PidGain::ALL
            .into_iter()
            .find(|gain| gain.mnemonic().eq_ignore_ascii_case(s))
            .ok_or_else(|| LockboxError::InvalidValue(format!("unknown PID gain '{s}'")))
    }
}

/// Slow analog pins on the extension connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalogPin {
    Aout0,
    Aout1,
    Aout2,
    Aout3,
    Ain0,
    Ain1,
    Ain2,
    Ain3,
}

impl AnalogPin {
    pub const ALL: [AnalogPin; 8] = [
        AnalogPin::Aout0,
        AnalogPin::Aout1,
        AnalogPin::Aout2,
        AnalogPin::Aout3,
        AnalogPin::Ain0,
        AnalogPin::Ain1,
        AnalogPin::Ain2,
        AnalogPin::Ain3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalogPin::Aout0 => "AOUT0",
            AnalogPin::Aout1 => "AOUT1",
            AnalogPin::Aout2 => "AOUT2",
            AnalogPin::Aout3 => "AOUT3",
            AnalogPin::Ain0 => "AIN0",
            AnalogPin::Ain1 => "AIN1",
            AnalogPin::Ain2 => "AIN2",
            AnalogPin::Ain3 => "AIN3",
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            AnalogPin::Ain0 | AnalogPin::Ain1 | AnalogPin::Ain2 | AnalogPin::Ain3
        )
    }
}

impl fmt::Display for AnalogPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalogPin {
    type Err = LockboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalogPin::ALL
            .into_iter()
            .find(|pin| pin.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LockboxError::InvalidValue(format!("unknown analog pin '{s}'")))
    }
}

/// Signal generator waveforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    SawUp,
    SawDown,
    Pwm,
    Arbitrary,
}

impl Waveform {
    pub const ALL: [Waveform; 7] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::SawUp,
        Waveform::SawDown,
        Waveform::Pwm,
        Waveform::Arbitrary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "SINE",
            Waveform::Square => "SQUARE",
            Waveform::Triangle => "TRIANGLE",
            Waveform::SawUp => "SAWU",
            Waveform::SawDown => "SAWD",
            Waveform::Pwm => "PWM",
            Waveform::Arbitrary => "ARBITRARY",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = LockboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Waveform::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LockboxError::InvalidValue(format!("unknown waveform '{s}'")))
    }
}
