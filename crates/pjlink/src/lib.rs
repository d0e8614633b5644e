//! PJLink class 1 projector control.
//!
//! PJLink is a line-oriented TCP protocol (port 4352) for controlling
//! projectors: power, input selection, audio/video mute, lamp and error
//! status, and identity strings.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connect with deadlines and a buffered duplex stream
//! - [`frame`]: command/response line codec and device error codes
//! - [`session`]: authentication handshake and typed projector commands
//!
//! ```no_run
//! use pjlink::session::{connect, StaticPassword};
//!
//! # fn main() -> pjlink::session::Result<()> {
//! let mut conn = connect("192.0.2.10", 4352, &mut StaticPassword::new("secret"))?;
//! println!("{}", conn.projector.get_power()?);
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use pjlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pjlink_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use pjlink_session::*;
}
