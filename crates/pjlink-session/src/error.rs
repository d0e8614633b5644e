use pjlink_frame::{DeviceError, FrameError};
use pjlink_transport::TransportError;

/// Errors that can occur in projector sessions.
#[derive(Debug, thiserror::Error)]
pub enum ProjectorError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The projector sent something the session cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The projector answered with `ERR1`..`ERR4`.
    #[error("{0}")]
    Device(#[from] DeviceError),

    /// A caller-supplied argument was rejected before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The projector rejected the password; the session accepts no commands.
    #[error("session locked: authentication was rejected")]
    Locked,

    /// The operation is not allowed in the current session state.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// The projector requires a password and none was available.
    #[error("password required")]
    PasswordRequired,

    /// I/O error outside the framed exchange (e.g. reading a password).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProjectorError {
    /// Whether the session can no longer be used after this error.
    ///
    /// Device errors and arguments rejected before any I/O leave the stream
    /// in sync; every other failure means the byte stream position is
    /// unknown or the projector has stopped listening.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Device(_)
                | Self::InvalidArgument(_)
                | Self::InvalidState(_)
                | Self::Frame(FrameError::InvalidBody(_) | FrameError::ParamTooLong { .. })
        )
    }

    pub(crate) fn undecodable(what: &str, param: &[u8]) -> Self {
        Self::Protocol(format!(
            "unexpected {what}: {:?}",
            String::from_utf8_lossy(param)
        ))
    }
}

pub type Result<T> = std::result::Result<T, ProjectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(!ProjectorError::Device(DeviceError::OutOfParameter).is_fatal());
        assert!(!ProjectorError::InvalidArgument("x".into()).is_fatal());
        assert!(ProjectorError::Locked.is_fatal());
        assert!(ProjectorError::Frame(FrameError::ConnectionClosed).is_fatal());
        assert!(ProjectorError::Protocol("x".into()).is_fatal());
    }

    #[test]
    fn device_error_displays_message() {
        let err = ProjectorError::from(DeviceError::UnavailableTime);
        assert_eq!(err.to_string(), "unavailable time");
    }
}
