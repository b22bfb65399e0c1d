//! Write-then-read-back sequence for PID gains
//!
//! Each step writes one gain and immediately queries it, printing the raw
//! reply. The default sequence sets `Kg`, `KP`, `KD` and `KII` on IN1/OUT1,
//! which is the usual smoke test after flashing a lockbox.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::LockboxError;
use crate::lockbox::{Lockbox, ScpiInterface};
use crate::types::{PidChannel, PidGain};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainStep {
    pub gain: PidGain,
    pub value: f64,
}

impl GainStep {
    pub fn new(gain: PidGain, value: f64) -> Self {
        Self { gain, value }
    }
}

/// Reply to the query that followed a gain write
#[derive(Debug, Clone, PartialEq)]
pub struct GainReadback {
    pub gain: PidGain,
    pub written: f64,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GainSequence {
    pub channel: PidChannel,
    pub steps: Vec<GainStep>,
}

impl Default for GainSequence {
    fn default() -> Self {
        Self {
            channel: PidChannel::IN1_OUT1,
            steps: default_steps(),
        }
    }
}

/// Kg 4096, KP 4096, KD 1e-7 s, KII 1000 1/s
pub fn default_steps() -> Vec<GainStep> {
    vec![
        GainStep::new(PidGain::Kg, 4096.0),
        GainStep::new(PidGain::Kp, 4096.0),
        GainStep::new(PidGain::Kd, 1e-7),
        GainStep::new(PidGain::Kii, 1000.0),
    ]
}

impl GainSequence {
    pub fn new(channel: PidChannel, steps: Vec<GainStep>) -> Self {
        Self { channel, steps }
    }

    /// Run every step in order, writing each reply as one line to `out`.
    ///
    /// Stops at the first failure and returns it; nothing is retried.
    pub fn run<I, W>(
        &self,
        lockbox: &mut Lockbox<I>,
        out: &mut W,
    ) -> Result<Vec<GainReadback>, LockboxError>
    where
        I: ScpiInterface,
        W: Write + ?Sized,
    {
        info!(
            "Writing {} gains on PID {}",
            self.steps.len(),
            self.channel
        );

        let mut readbacks = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            lockbox.set_gain(self.channel, step.gain, step.value)?;
            let response = lockbox.gain_raw(self.channel, step.gain)?;
            debug!("{} written {} read {}", step.gain, step.value, response);

            writeln!(out, "{response}").map_err(|source| LockboxError::Io {
                source,
                context: "Writing readback".to_string(),
            })?;

            readbacks.push(GainReadback {
                gain: step.gain,
                written: step.value,
                response,
            });
        }

        Ok(readbacks)
    }
}
