mod config;

use chrono::Utc;
use clap::Parser;
use env_logger::Env;
use log::{error, info, LevelFilter};
use rp_lockbox::{
    GainSequence, Lockbox, LockboxClient, Logger, ScpiInterface, TranscriptEntry,
    TranscriptInterface,
};
use std::{fs, io, path::PathBuf};

use crate::config::{load_config, AppConfig};

/// Red Pitaya lockbox PID gain check
#[derive(Parser, Debug)]
#[command(name = "scpi-gain-test")]
#[command(about = "Write PID gains to a Red Pitaya lockbox and print the read-back values", long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ./lockbox.toml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// IP address or host name of the Red Pitaya
    #[arg(long)]
    host: Option<String>,

    /// SCPI server port
    #[arg(long)]
    port: Option<u16>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// PID input channel (1 or 2)
    #[arg(long)]
    input: Option<u8>,

    /// PID output channel (1 or 2)
    #[arg(long)]
    output: Option<u8>,

    /// Record every command and reply to a JSONL transcript
    #[arg(long)]
    transcript: bool,
}

/// Usage:
///   scpi-gain-test
///   scpi-gain-test --host 192.168.50.37 --input 2 --output 1
///   scpi-gain-test --config lockbox.toml --log-level debug
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.console.verbosity.clone());
    initialize_logging(&log_level);
    log_startup_info(&config, args.config.as_ref());

    let sequence = config.gain_sequence()?;
    let mut lockbox = Lockbox::new(setup_interface(&config)?);

    run_and_report(&sequence, &mut lockbox)
}

// Helper Functions

/// Command-line values take precedence over file and environment
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(host) = &args.host {
        config.lockbox.host = host.clone();
    }
    if let Some(port) = args.port {
        config.lockbox.port = port;
    }
    if let Some(timeout) = args.timeout {
        config.lockbox.timeout_secs = Some(timeout);
    }
    if let Some(input) = args.input {
        config.pid.input = input;
    }
    if let Some(output) = args.output {
        config.pid.output = output;
    }
    if args.transcript {
        config.transcript.enabled = true;
    }
}

fn log_startup_info(config: &AppConfig, config_path: Option<&PathBuf>) {
    info!("=== Lockbox SCPI Gain Test ===");
    match config_path {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: defaults"),
    }
    info!("Lockbox: {}:{}", config.lockbox.host, config.lockbox.port);
    info!(
        "Timeout: {}",
        config
            .lockbox
            .timeout_secs
            .map(|t| format!("{t} s"))
            .unwrap_or_else(|| "disabled".to_string())
    );
    info!("PID: IN{} -> OUT{}", config.pid.input, config.pid.output);
}

/// Open the connection with the configured address and timeout
fn connect_client(config: &AppConfig) -> Result<LockboxClient, Box<dyn std::error::Error>> {
    let client = LockboxClient::builder()
        .address(&config.lockbox.host)
        .port(config.lockbox.port)
        .timeout(config.timeout()?)
        .build()?;
    info!("Connected to lockbox");
    Ok(client)
}

/// Connect to the lockbox, wrapping the client in a transcript if enabled
fn setup_interface(
    config: &AppConfig,
) -> Result<Box<dyn ScpiInterface>, Box<dyn std::error::Error>> {
    let client = connect_client(config)?;

    if !config.transcript.enabled {
        return Ok(Box::new(client));
    }

    let path = create_transcript_path(&config.transcript.output_path)?;
    let logger: Logger<TranscriptEntry> = Logger::new(path, 64, config.transcript.json);
    info!("Transcript: {}", logger.path().display());
    Ok(Box::new(TranscriptInterface::new(client, logger)))
}

fn run_and_report(
    sequence: &GainSequence,
    lockbox: &mut Lockbox<Box<dyn ScpiInterface>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match sequence.run(lockbox, &mut out) {
        Ok(readbacks) => {
            info!("✓ {} gains written and read back", readbacks.len());
            Ok(())
        }
        Err(e) => {
            error!("✗ Gain test failed: {}", e);
            Err(e.into())
        }
    }
}

/// Initialize logging with configurable level
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => {
            eprintln!("Warning: Invalid log level '{}', using 'info'", log_level);
            LevelFilter::Info
        }
    };

    env_logger::Builder::from_env(Env::default())
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}

fn create_transcript_path(log_path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = PathBuf::from(log_path);
    fs::create_dir_all(&dir)?;

    let filename = format!("transcript_{}.jsonl", Utc::now().format("%Y%m%d_%H%M%S"));
    Ok(dir.join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_no_arguments_reproduces_bench_defaults() {
        let args = Args::parse_from(["scpi-gain-test"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.lockbox.host, "192.168.50.37");
        assert_eq!(config.gain_sequence().unwrap(), GainSequence::default());
        assert!(!config.transcript.enabled);
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "scpi-gain-test",
            "--host",
            "rp-f0a1b2.local",
            "--timeout",
            "2.5",
            "--input",
            "2",
            "--transcript",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.lockbox.host, "rp-f0a1b2.local");
        assert_eq!(config.lockbox.timeout_secs, Some(2.5));
        assert_eq!(config.pid.input, 2);
        assert_eq!(config.pid.output, 1);
        assert!(config.transcript.enabled);
    }

    #[test]
    fn test_out_of_range_channel_fails_validation() {
        let args = Args::parse_from(["scpi-gain-test", "--output", "0"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connects_with_configured_endpoint_before_any_command() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut reader = BufReader::new(stream);
            let mut received = Vec::new();
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                let command = line.trim_end().to_string();
                if command.ends_with('?') {
                    writer.write_all(b"ok\r\n").unwrap();
                }
                received.push(command);
                line.clear();
            }
            received
        });

        let mut config = AppConfig::default();
        config.lockbox.host = "127.0.0.1".to_string();
        config.lockbox.port = port;
        config.lockbox.timeout_secs = Some(2.0);

        let client = connect_client(&config).unwrap();
        assert_eq!(client.address(), "127.0.0.1");
        assert_eq!(client.port(), port);
        assert_eq!(client.config().connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(client.config().read_timeout, Some(Duration::from_secs(2)));
        assert_eq!(client.config().write_timeout, Some(Duration::from_secs(2)));

        let mut lockbox = Lockbox::new(client);
        let mut out = Vec::new();
        config
            .gain_sequence()
            .unwrap()
            .run(&mut lockbox, &mut out)
            .unwrap();
        drop(lockbox);

        assert_eq!(String::from_utf8(out).unwrap(), "ok\nok\nok\nok\n");
        let received = server.join().unwrap();
        assert_eq!(received.len(), 8);
        assert_eq!(received[0], "PID:IN1:OUT1:Kg 4096");
        assert_eq!(received[7], "PID:IN1:OUT1:KII?");
    }

    #[test]
    fn test_oversized_timeout_is_a_config_error() {
        let args = Args::parse_from(["scpi-gain-test", "--timeout", "1e30"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);

        assert!(config.validate().is_err());
        assert!(connect_client(&config).is_err());
    }
}
