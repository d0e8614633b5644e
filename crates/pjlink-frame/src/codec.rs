use bytes::{BufMut, Bytes, BytesMut};

use crate::body::Body;
use crate::error::{FrameError, Result};

/// Response header: `%` (1) + class (1) + body (4) + separator (1) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Maximum parameter length in bytes.
pub const MAX_PARAM_LEN: usize = 128;

/// Line terminator.
pub const TERMINATOR: u8 = b'\r';

/// Parameter used by every query.
pub const QUERY: &[u8] = b"?";

/// Leading byte of every command and response.
pub const MARKER: u8 = b'%';

/// Protocol class. Only class 1 is implemented.
pub const CLASS: u8 = b'1';

/// Separator between body and parameter on requests.
pub const REQUEST_SEPARATOR: u8 = b' ';

/// Separator between body and parameter on responses.
pub const RESPONSE_SEPARATOR: u8 = b'=';

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command body.
    pub body: Body,
    /// The parameter bytes (at most [`MAX_PARAM_LEN`]).
    pub param: Bytes,
}

impl Command {
    /// Validate a request. Nothing is encoded until [`Command::encode`].
    pub fn new(body: Body, param: impl Into<Bytes>) -> Result<Self> {
        let param = param.into();
        check_param(&param)?;
        Ok(Self { body, param })
    }

    /// A `?` query for `body`.
    pub fn query(body: Body) -> Self {
        Self {
            body,
            param: Bytes::from_static(QUERY),
        }
    }

    /// Append the wire form of this command to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        dst.put_u8(MARKER);
        dst.put_u8(CLASS);
        dst.put_slice(self.body.as_bytes());
        dst.put_u8(REQUEST_SEPARATOR);
        dst.put_slice(&self.param);
        dst.put_u8(TERMINATOR);
    }

    /// The total wire size of this command.
    pub fn wire_size(&self) -> usize {
        2 + 4 + 1 + self.param.len() + 1
    }
}

/// A decoded response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The echoed body, uppercased.
    pub body: Body,
    /// The raw parameter, without the terminator.
    pub param: Bytes,
}

/// Encode a command into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────┬───────┬──────────┬─────┬──────────────┬─────┐
/// │ '%' │ '1'   │ Body(4B) │ ' ' │ Param ≤128B  │ \r  │
/// └─────┴───────┴──────────┴─────┴──────────────┴─────┘
/// ```
///
/// Both `body` and `param` are validated before anything is appended.
pub fn encode_command(body: &[u8], param: &[u8], dst: &mut BytesMut) -> Result<()> {
    let body = Body::new(body)?;
    check_param(param)?;
    Command {
        body,
        param: Bytes::copy_from_slice(param),
    }
    .encode(dst);
    Ok(())
}

/// Validate a 7-byte response header and return the uppercased body.
///
/// `header` may be short when the stream ended early; the first missing or
/// wrong position determines the error.
pub fn decode_header(header: &[u8]) -> Result<Body> {
    if header.first() != Some(&MARKER) {
        return Err(FrameError::InvalidHeader(FrameError::lossy(header)));
    }

    if header.get(1) != Some(&CLASS) {
        return Err(FrameError::UnsupportedVersion(FrameError::lossy(header)));
    }

    let body = match header.get(2..6) {
        Some(raw) => {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(raw);
            Body::from_wire(bytes)
        }
        None => return Err(FrameError::InvalidSeparator(FrameError::lossy(header))),
    };

    if header.len() != HEADER_SIZE || header[6] != RESPONSE_SEPARATOR {
        return Err(FrameError::InvalidSeparator(FrameError::lossy(header)));
    }

    Ok(body)
}

fn check_param(param: &[u8]) -> Result<()> {
    if param.len() > MAX_PARAM_LEN {
        return Err(FrameError::ParamTooLong {
            len: param.len(),
            max: MAX_PARAM_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{INPT, POWR};

    fn encode(body: &[u8], param: &[u8]) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        encode_command(body, param, &mut buf)?;
        Ok(buf.to_vec())
    }

    #[test]
    fn test_encode_normal() {
        assert_eq!(encode(b"POWR", b"foo").unwrap(), b"%1POWR foo\r");
        assert_eq!(encode(b"INPT", b"").unwrap(), b"%1INPT \r");
    }

    #[test]
    fn test_encode_body_must_be_four_chars() {
        assert!(matches!(
            encode(b"INP", b""),
            Err(FrameError::InvalidBody(_))
        ));
        assert!(matches!(
            encode(b"INPTT", b""),
            Err(FrameError::InvalidBody(_))
        ));
        assert!(matches!(
            encode(b"inpt", b""),
            Err(FrameError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_encode_param_limit() {
        assert!(encode(b"INPT", &[b'a'; 127]).is_ok());
        let at_limit = encode(b"INPT", &[b'a'; 128]).unwrap();
        assert_eq!(at_limit.len(), 2 + 4 + 1 + 128 + 1);

        assert!(matches!(
            encode(b"INPT", &[b'a'; 129]),
            Err(FrameError::ParamTooLong { len: 129, max: 128 })
        ));
        assert!(matches!(
            encode(b"INPT", &[b'a'; 130]),
            Err(FrameError::ParamTooLong { len: 130, .. })
        ));
    }

    #[test]
    fn test_encode_validates_before_writing() {
        let mut buf = BytesMut::from(&b"prefix"[..]);
        assert!(encode_command(b"INPT", &[b'a'; 200], &mut buf).is_err());
        assert!(encode_command(b"IN", b"?", &mut buf).is_err());
        assert_eq!(buf.as_ref(), b"prefix");
    }

    #[test]
    fn test_command_query_and_wire_size() {
        let cmd = Command::query(POWR);
        let mut buf = BytesMut::new();
        cmd.encode(&mut buf);
        assert_eq!(buf.as_ref(), b"%1POWR ?\r");
        assert_eq!(cmd.wire_size(), buf.len());

        assert!(Command::new(INPT, vec![b'x'; 129]).is_err());
    }

    #[test]
    fn test_decode_header() {
        assert_eq!(decode_header(b"%1POWR=").unwrap(), POWR);
        assert_eq!(decode_header(b"%1aBc4=").unwrap().as_bytes(), b"ABC4");

        assert!(matches!(
            decode_header(b""),
            Err(FrameError::InvalidHeader(_))
        ));
        assert!(matches!(
            decode_header(b"$1POWR="),
            Err(FrameError::InvalidHeader(_))
        ));
        assert!(matches!(
            decode_header(b"%"),
            Err(FrameError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode_header(b"%2POWR="),
            Err(FrameError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode_header(b"%1ABCD"),
            Err(FrameError::InvalidSeparator(_))
        ));
        assert!(matches!(
            decode_header(b"%1ABCD "),
            Err(FrameError::InvalidSeparator(_))
        ));
    }
}
