//! TCP transport for PJLink projector control.
//!
//! PJLink devices listen on TCP port 4352. This crate owns the socket:
//! connecting with a deadline, applying read/write timeouts, and wrapping
//! the socket in a buffered duplex so the line codec above can read one
//! byte at a time without a syscall per byte.
//!
//! This is the lowest layer of pjlink. The codec and session layers only
//! require `Read + Write`, so any duplex byte stream can stand in for
//! [`PjlinkStream`] in tests.

pub mod buffered;
pub mod error;
pub mod tcp;
pub mod traits;

pub use buffered::BufStream;
pub use error::{Result, TransportError};
pub use tcp::{TcpTransport, DEFAULT_PORT};
pub use traits::PjlinkStream;
