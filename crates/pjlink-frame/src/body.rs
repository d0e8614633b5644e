//! Command bodies.
//!
//! A body is the 4-character command identifier following `%1`. Bodies are
//! case-insensitive on the wire; this crate always sends them uppercase and
//! normalizes received bodies to uppercase.

use std::fmt;

use crate::error::{FrameError, Result};

/// A validated 4-byte command body.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Body([u8; 4]);

/// Power control / query.
pub const POWR: Body = Body(*b"POWR");

/// Input switch / query.
pub const INPT: Body = Body(*b"INPT");

/// Audio/video mute.
pub const AVMT: Body = Body(*b"AVMT");

/// Error status query.
pub const ERST: Body = Body(*b"ERST");

/// Lamp hours and state query.
pub const LAMP: Body = Body(*b"LAMP");

/// Available input list query.
pub const INST: Body = Body(*b"INST");

/// Projector name query.
pub const NAME: Body = Body(*b"NAME");

/// Manufacturer name query.
pub const INF1: Body = Body(*b"INF1");

/// Product name query.
pub const INF2: Body = Body(*b"INF2");

/// Other information query.
pub const INFO: Body = Body(*b"INFO");

/// Class information query.
pub const CLSS: Body = Body(*b"CLSS");

impl Body {
    /// Validate a body supplied by a caller.
    ///
    /// The body must be exactly 4 ASCII bytes, each an uppercase letter or a
    /// digit, with at least one letter.
    pub fn new(raw: &[u8]) -> Result<Self> {
        let bytes: [u8; 4] = raw
            .try_into()
            .map_err(|_| FrameError::InvalidBody(FrameError::lossy(raw)))?;

        let charset_ok = bytes
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        let has_letter = bytes.iter().any(u8::is_ascii_uppercase);
        if !charset_ok || !has_letter {
            return Err(FrameError::InvalidBody(FrameError::lossy(raw)));
        }

        Ok(Self(bytes))
    }

    /// Build a body from received bytes, uppercasing ASCII letters.
    ///
    /// Used on the decode path only, where the wire is allowed any case.
    pub(crate) fn from_wire(raw: [u8; 4]) -> Self {
        Self(raw.map(|b| b.to_ascii_uppercase()))
    }

    /// The raw body bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The body as text. Non-ASCII wire bytes are replaced.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.as_str())
    }
}

impl TryFrom<&str> for Body {
    type Error = FrameError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value.as_bytes())
    }
}

/// Returns a human-readable name for a body.
pub fn body_name(body: Body) -> &'static str {
    match body {
        POWR => "power",
        INPT => "input",
        AVMT => "av-mute",
        ERST => "error-status",
        LAMP => "lamp",
        INST => "input-list",
        NAME => "name",
        INF1 => "manufacturer",
        INF2 => "product-name",
        INFO => "other-info",
        CLSS => "class",
        _ => "unknown",
    }
}
