use std::time::Duration;

use pjlink_transport::{BufStream, TcpTransport};
use tracing::debug;

use crate::error::Result;
use crate::handshake::AuthOutcome;
use crate::password::PasswordSource;
use crate::projector::Projector;

/// Timeouts applied to a projector connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Bound on establishing the TCP connection, per resolved address.
    pub timeout: Duration,
    /// Bound on each blocking read. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Bound on each blocking write. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

impl ConnectConfig {
    /// Use `timeout` for connecting, reading and writing.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            timeout,
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
        }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(5))
    }
}

/// An authenticated (or rejected) projector connection.
#[derive(Debug)]
pub struct Connection {
    pub projector: Projector<BufStream>,
    pub auth: AuthOutcome,
}

impl Connection {
    /// Whether the projector rejected the password.
    pub fn is_locked(&self) -> bool {
        self.auth.is_rejected()
    }
}

/// Connect to a projector with default timeouts and authenticate.
pub fn connect(host: &str, port: u16, password: &mut dyn PasswordSource) -> Result<Connection> {
    connect_with_config(host, port, &ConnectConfig::default(), password)
}

/// Connect with explicit timeouts and authenticate.
///
/// A rejected password is not an error: the returned connection carries
/// [`AuthOutcome::Rejected`] and its projector refuses further commands.
pub fn connect_with_config(
    host: &str,
    port: u16,
    config: &ConnectConfig,
    password: &mut dyn PasswordSource,
) -> Result<Connection> {
    let stream = TcpTransport::connect(host, port, config.timeout)?;
    stream.set_read_timeout(config.read_timeout)?;
    stream.set_write_timeout(config.write_timeout)?;
    debug!(host, port, ?config, "configured projector stream");

    let mut projector = Projector::new(BufStream::new(stream)?);
    let auth = projector.authenticate(password)?;
    Ok(Connection { projector, auth })
}
