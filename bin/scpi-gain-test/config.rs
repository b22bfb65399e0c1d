use config::{Config, ConfigError, Environment, File};
use rp_lockbox::gain_sequence::default_steps;
use rp_lockbox::{GainSequence, GainStep, PidChannel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub lockbox: LockboxConfig,
    pub pid: PidConfig,
    pub gains: GainsConfig,
    pub console: ConsoleConfig,
    pub transcript: TranscriptConfig,
}

impl AppConfig {
    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pid_channel()?;

        self.timeout()?;

        if let Some(step) = self.gain_steps().iter().find(|s| !s.value.is_finite()) {
            return Err(ConfigError::Message(format!(
                "gain {} has non-finite value {}",
                step.gain, step.value
            )));
        }

        Ok(())
    }

    pub fn pid_channel(&self) -> Result<PidChannel, ConfigError> {
        PidChannel::new(self.pid.input, self.pid.output)
            .map_err(|e| ConfigError::Message(format!("Invalid pid section: {e}")))
    }

    /// Socket timeout, `None` when `timeout_secs` is absent
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        let Some(secs) = self.lockbox.timeout_secs else {
            return Ok(None);
        };

        match Duration::try_from_secs_f64(secs) {
            Ok(timeout) if !timeout.is_zero() => Ok(Some(timeout)),
            _ => Err(ConfigError::Message(format!(
                "lockbox.timeout_secs must be a positive number of seconds, got {secs}"
            ))),
        }
    }

    /// Configured gain steps, or the default Kg/KP/KD/KII steps
    pub fn gain_steps(&self) -> Vec<GainStep> {
        self.gains.steps.clone().unwrap_or_else(default_steps)
    }

    pub fn gain_sequence(&self) -> Result<GainSequence, ConfigError> {
        Ok(GainSequence::new(self.pid_channel()?, self.gain_steps()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LockboxConfig {
    /// IP address or host name of the Red Pitaya
    pub host: String,
    pub port: u16,
    /// Connect/read/write timeout in seconds; absent disables timeouts
    pub timeout_secs: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PidConfig {
    pub input: u8,
    pub output: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GainsConfig {
    /// Replaces the default steps as a whole when set
    pub steps: Option<Vec<GainStep>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConsoleConfig {
    pub verbosity: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TranscriptConfig {
    pub enabled: bool,
    pub output_path: String,
    /// Rewrite the transcript as a JSON array when the run ends
    pub json: bool,
}

impl Default for LockboxConfig {
    fn default() -> Self {
        Self {
            host: "192.168.50.37".to_string(),
            port: 5000,
            timeout_secs: Some(5.0),
        }
    }
}

impl Default for PidConfig {
    fn default() -> Self {
        Self { input: 1, output: 1 }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            verbosity: "info".to_string(),
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_path: "./logs".to_string(),
            json: false,
        }
    }
}

/// Load configuration from file with layered fallbacks
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

    if let Some(path) = config_path {
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            return Err(ConfigError::Message(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    } else if Path::new("lockbox.toml").exists() {
        builder = builder.add_source(File::with_name("lockbox.toml"));
    }

    // Environment variable overrides, e.g. RP_LOCKBOX__LOCKBOX__HOST
    builder = builder.add_source(
        Environment::with_prefix("RP_LOCKBOX")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_lockbox::PidGain;

    #[test]
    fn test_defaults_match_bench_setup() {
        let config = AppConfig::default();
        assert_eq!(config.lockbox.host, "192.168.50.37");
        assert_eq!(config.lockbox.port, 5000);
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_secs(5)));
        assert_eq!(config.gain_sequence().unwrap(), GainSequence::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lockbox.toml");
        std::fs::write(
            &path,
            r#"
[lockbox]
host = "10.0.0.2"
timeout_secs = 1.5

[pid]
input = 2
output = 1

[gains]
steps = [
    { gain = "KP", value = 100.0 },
    { gain = "KI", value = 5.0e3 },
]
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.lockbox.host, "10.0.0.2");
        assert_eq!(config.lockbox.port, 5000);
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_millis(1500)));

        let sequence = config.gain_sequence().unwrap();
        assert_eq!(sequence.channel, PidChannel::new(2, 1).unwrap());
        assert_eq!(
            sequence.steps,
            vec![
                GainStep::new(PidGain::Kp, 100.0),
                GainStep::new(PidGain::Ki, 5000.0),
            ]
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/lockbox.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let mut config = AppConfig::default();
        config.pid.output = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unrepresentable_timeout_rejected() {
        let mut config = AppConfig::default();

        for secs in [1e30, f64::INFINITY, f64::NAN, 0.0, -1.0, 1e-12] {
            config.lockbox.timeout_secs = Some(secs);
            assert!(config.validate().is_err(), "timeout {secs} accepted");
            assert!(config.timeout().is_err());
        }

        config.lockbox.timeout_secs = None;
        assert_eq!(config.timeout().unwrap(), None);
        assert!(config.validate().is_ok());
    }
}
