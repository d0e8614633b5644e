//! PJLink class 1 projector sessions.
//!
//! Connect to a projector, authenticate if it asks for a password, and issue
//! typed power, input, mute, status and identity commands. Every command is
//! a strictly sequential request/response round trip on one connection.

pub mod connector;
pub mod error;
pub mod handshake;
pub mod password;
pub mod projector;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use connector::{connect, connect_with_config, ConnectConfig, Connection};
pub use error::{ProjectorError, Result};
pub use handshake::{authenticate, password_digest, read_greeting, AuthOutcome, Greeting};
pub use password::{NoPassword, PasswordSource, StaticPassword};
pub use projector::{Projector, SessionState};
pub use types::{
    ErrorLevel, ErrorReport, Input, InputSource, Lamp, MuteState, MuteTarget, PowerState,
    ProjectorInfo, MUTE_AUDIO, MUTE_VIDEO,
};
