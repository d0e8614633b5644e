use std::fmt;

/// One of the four fixed error replies a projector may send in place of a
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceError {
    /// `ERR1`: the command body is not supported.
    UndefinedCommand,
    /// `ERR2`: the parameter is out of range.
    OutOfParameter,
    /// `ERR3`: the projector cannot accept the command right now.
    UnavailableTime,
    /// `ERR4`: the projector reports an internal failure.
    ProjectorFailure,
}

impl DeviceError {
    /// Classify a response parameter. Only exact matches count.
    pub fn from_param(param: &[u8]) -> Option<Self> {
        match param {
            b"ERR1" => Some(Self::UndefinedCommand),
            b"ERR2" => Some(Self::OutOfParameter),
            b"ERR3" => Some(Self::UnavailableTime),
            b"ERR4" => Some(Self::ProjectorFailure),
            _ => None,
        }
    }

    /// The wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::UndefinedCommand => "ERR1",
            Self::OutOfParameter => "ERR2",
            Self::UnavailableTime => "ERR3",
            Self::ProjectorFailure => "ERR4",
        }
    }

    /// The human-readable message.
    pub fn message(self) -> &'static str {
        match self {
            Self::UndefinedCommand => "undefined command",
            Self::OutOfParameter => "out of parameter",
            Self::UnavailableTime => "unavailable time",
            Self::ProjectorFailure => "projector failure",
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for DeviceError {}
