use std::fmt;
use std::io;

use pjlink_frame::FrameError;
use pjlink_session::ProjectorError;
use pjlink_transport::TransportError;

pub const SUCCESS: i32 = 0;
/// Device error reply, or the projector could not be reached.
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
/// Password rejected or unavailable.
pub const PERMISSION_DENIED: i32 = 50;
/// The projector sent something that could not be decoded.
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::InvalidBody(_) | FrameError::ParamTooLong { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn projector_error(context: &str, err: ProjectorError) -> CliError {
    match err {
        ProjectorError::Transport(err) => transport_error(context, err),
        ProjectorError::Frame(err) => frame_error(context, err),
        ProjectorError::Io(err) => io_error(context, err),
        ProjectorError::Protocol(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        ProjectorError::Device(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        ProjectorError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        ProjectorError::Locked | ProjectorError::PasswordRequired => {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
