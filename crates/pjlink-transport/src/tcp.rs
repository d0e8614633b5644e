use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::PjlinkStream;

/// TCP port PJLink devices listen on.
pub const DEFAULT_PORT: u16 = 4352;

/// TCP transport.
///
/// Connects to a projector by host name or address, trying each resolved
/// address in turn until one accepts within the deadline.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to `host:port` (blocking), bounded by `timeout` per address.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<PjlinkStream> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            match Self::connect_addr(addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| TransportError::Resolve {
            host: host.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ),
        }))
    }

    /// Connect to a single socket address (blocking).
    pub fn connect_addr(addr: SocketAddr, timeout: Duration) -> Result<PjlinkStream> {
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|source| TransportError::Connect { addr, source })?;
        // Commands are tiny and strictly request/response.
        stream.set_nodelay(true)?;
        info!(%addr, "connected to projector");
        Ok(PjlinkStream::from_tcp(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn test_connect_and_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let mut client =
                TcpTransport::connect("127.0.0.1", port, Duration::from_secs(2)).unwrap();
            client.write_all(b"hello").unwrap();
            client.flush().unwrap();
        });

        let (mut server, _) = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to obtain a port that is very likely closed.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = TcpTransport::connect("127.0.0.1", port, Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_timeouts_and_clone() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let stream = TcpTransport::connect_addr(addr, Duration::from_secs(2)).unwrap();
        let _server = listener.accept().unwrap();

        stream
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        stream
            .set_write_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        let clone = stream.try_clone().unwrap();
        assert_eq!(clone.peer_addr().unwrap(), addr);
        assert!(format!("{stream:?}").contains("tcp"));
    }
}
