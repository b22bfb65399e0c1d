use super::protocol::{Protocol, DEFAULT_PORT};
use crate::error::LockboxError;
use log::{debug, warn};
use std::io::{ErrorKind, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

mod scpi_impl;

/// Connection configuration for the lockbox TCP client.
///
/// `None` disables the corresponding timeout: connecting then waits for the
/// operating system's own limit and reads block until a reply arrives.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rp_lockbox::ConnectionConfig;
///
/// // Same limit for every phase, like the lockbox Python client
/// let config = ConnectionConfig::uniform(Some(Duration::from_secs(5)));
///
/// // Patient reads on a slow link
/// let config = ConnectionConfig {
///     read_timeout: Some(Duration::from_secs(30)),
///     ..ConnectionConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Timeout for establishing the TCP connection
    pub connect_timeout: Option<Duration>,
    /// Timeout for waiting on a reply
    pub read_timeout: Option<Duration>,
    /// Timeout for writing a command
    pub write_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn uniform(timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout: timeout,
            read_timeout: timeout,
            write_timeout: timeout,
        }
    }

    fn validate(&self) -> Result<(), LockboxError> {
        let timeouts = [self.connect_timeout, self.read_timeout, self.write_timeout];
        if timeouts.iter().flatten().any(Duration::is_zero) {
            return Err(LockboxError::InvalidValue(
                "timeouts must be non-zero, use None to disable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::uniform(Some(Duration::from_secs(5)))
    }
}

/// Builder for [`LockboxClient`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use rp_lockbox::LockboxClient;
///
/// let client = LockboxClient::builder()
///     .address("192.168.50.37")
///     .port(5000)
///     .timeout(Some(Duration::from_secs(5)))
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default)]
pub struct LockboxClientBuilder {
    address: Option<String>,
    port: Option<u16>,
    config: ConnectionConfig,
}

impl LockboxClientBuilder {
    /// Host name or IP address of the Red Pitaya
    pub fn address(mut self, addr: &str) -> Self {
        self.address = Some(addr.to_string());
        self
    }

    /// SCPI server port, 5000 unless changed on the device
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Use one timeout for connecting, reading and writing
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config = ConnectionConfig::uniform(timeout);
        self
    }

    /// Set the full connection configuration
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    /// Resolve the address and open the connection
    pub fn build(self) -> Result<LockboxClient, LockboxError> {
        let address = self
            .address
            .ok_or_else(|| LockboxError::InvalidAddress("address must be specified".to_string()))?;
        let port = self.port.unwrap_or(DEFAULT_PORT);
        self.config.validate()?;

        let socket_addrs: Vec<SocketAddr> = (address.as_str(), port)
            .to_socket_addrs()
            .map_err(|_| LockboxError::InvalidAddress(address.clone()))?
            .collect();
        if socket_addrs.is_empty() {
            return Err(LockboxError::InvalidAddress(address));
        }

        let stream = open_stream(&address, &socket_addrs, &self.config)?;

        Ok(LockboxClient {
            address,
            port,
            socket_addrs,
            config: self.config,
            stream: Some(stream),
        })
    }
}

fn open_stream(
    address: &str,
    socket_addrs: &[SocketAddr],
    config: &ConnectionConfig,
) -> Result<TcpStream, LockboxError> {
    debug!("Connecting to lockbox at {address}");

    let mut last_error = None;
    for socket_addr in socket_addrs {
        let attempt = match config.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(socket_addr, timeout),
            None => TcpStream::connect(socket_addr),
        };
        match attempt {
            Ok(stream) => {
                stream.set_read_timeout(config.read_timeout)?;
                stream.set_write_timeout(config.write_timeout)?;
                stream.set_nodelay(true)?;
                debug!("Successfully connected to lockbox at {socket_addr}");
                return Ok(stream);
            }
            Err(e) => {
                warn!("Failed to connect to {socket_addr}: {e}");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) if e.kind() == ErrorKind::TimedOut => {
            LockboxError::Timeout(config.connect_timeout.unwrap_or_default())
        }
        Some(e) => LockboxError::Io {
            source: e,
            context: format!("Failed to connect to {address}"),
        },
        None => LockboxError::InvalidAddress(address.to_string()),
    })
}

/// Blocking TCP client for the Red Pitaya lockbox SCPI server.
///
/// Commands are plain text terminated by `\r\n`; replies use the same
/// delimiter. The client owns one connection for its lifetime and closes it
/// when dropped.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use rp_lockbox::LockboxClient;
///
/// let mut client = LockboxClient::new("192.168.50.37", Some(Duration::from_secs(5)))?;
///
/// client.tx_txt("PID:IN1:OUT1:KP 4096")?;
/// println!("{}", client.txrx_txt("PID:IN1:OUT1:KP?")?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct LockboxClient {
    address: String,
    port: u16,
    socket_addrs: Vec<SocketAddr>,
    config: ConnectionConfig,
    stream: Option<TcpStream>,
}

impl LockboxClient {
    /// Connect to `host` on the default SCPI port with one timeout for all phases.
    ///
    /// # Errors
    /// Returns `LockboxError` if:
    /// - The host cannot be resolved
    /// - The connection is refused or times out
    pub fn new(host: &str, timeout: Option<Duration>) -> Result<Self, LockboxError> {
        Self::builder().address(host).timeout(timeout).build()
    }

    pub fn builder() -> LockboxClientBuilder {
        LockboxClientBuilder::default()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Drop the current socket, if any, and connect again with the same settings.
    pub fn reconnect(&mut self) -> Result<(), LockboxError> {
        self.close();
        let stream = open_stream(&self.address, &self.socket_addrs, &self.config)?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Close the TCP connection. Further commands fail with `NotConnected`.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("Shutdown of lockbox connection reported: {e}");
            }
            debug!("Closed connection to {}:{}", self.address, self.port);
        }
    }

    /// Send a command and append the delimiter.
    pub fn tx_txt(&mut self, msg: &str) -> Result<(), LockboxError> {
        let write_timeout = self.config.write_timeout;
        let stream = self.stream.as_mut().ok_or(LockboxError::NotConnected)?;

        debug!("TX: {msg}");
        stream
            .write_all(&Protocol::frame(msg))
            .and_then(|_| stream.flush())
            .map_err(|e| match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                    LockboxError::Timeout(write_timeout.unwrap_or_default())
                }
                _ => LockboxError::Io {
                    source: e,
                    context: format!("Sending '{msg}'"),
                },
            })
    }

    /// Receive one reply and return it without the delimiter.
    pub fn rx_txt(&mut self) -> Result<String, LockboxError> {
        let read_timeout = self.config.read_timeout;
        let stream = self.stream.as_mut().ok_or(LockboxError::NotConnected)?;

        let reply = Protocol::read_reply(stream, read_timeout)?;
        debug!("RX: {reply}");
        Ok(reply)
    }

    /// Send a command and return the reply without the delimiter.
    pub fn txrx_txt(&mut self, msg: &str) -> Result<String, LockboxError> {
        self.tx_txt(msg)?;
        self.rx_txt()
    }
}

impl Drop for LockboxClient {
    fn drop(&mut self) {
        self.close();
    }
}
