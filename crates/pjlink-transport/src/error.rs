use std::net::SocketAddr;

/// Errors that can occur in PJLink transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host name did not resolve to any address.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error kind.
    pub fn kind(&self) -> std::io::ErrorKind {
        match self {
            TransportError::Resolve { source, .. } | TransportError::Connect { source, .. } => {
                source.kind()
            }
            TransportError::Io(err) => err.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
