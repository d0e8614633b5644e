/// Errors that can occur during PJLink line encoding/decoding.
///
/// Every variant except `Io` means the byte stream can no longer be trusted
/// to be aligned on line boundaries.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A command body was not exactly 4 uppercase ASCII characters.
    #[error("invalid command body {0:?} (expected 4 uppercase characters)")]
    InvalidBody(String),

    /// A request parameter exceeds the protocol maximum.
    #[error("parameter too long ({len} bytes, max {max})")]
    ParamTooLong { len: usize, max: usize },

    /// The response did not start with `%`.
    #[error("invalid header in {0:?}")]
    InvalidHeader(String),

    /// The response is not protocol class 1.
    #[error("unsupported protocol version in {0:?}")]
    UnsupportedVersion(String),

    /// The byte after the body was not `=`.
    #[error("invalid separator in {0:?}")]
    InvalidSeparator(String),

    /// The response echoed a different body than was sent.
    #[error("response body {actual} does not match request body {expected}")]
    BodyMismatch { expected: String, actual: String },

    /// The connection was closed before any response byte arrived.
    #[error("connection closed (no response)")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing lines.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    pub(crate) fn lossy(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
