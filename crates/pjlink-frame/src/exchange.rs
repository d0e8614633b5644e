use std::io::{Read, Write};

use bytes::Bytes;
use tracing::debug;

use crate::body::Body;
use crate::codec::Command;
use crate::device::DeviceError;
use crate::error::{FrameError, Result};
use crate::reader::decode_response;
use crate::writer::write_command;

/// Classified outcome of one command round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The projector answered with a parameter.
    Ok(Bytes),
    /// The projector answered with one of the fixed error codes.
    Error(DeviceError),
}

impl Reply {
    /// Classify a raw response parameter.
    pub fn classify(param: Bytes) -> Self {
        match DeviceError::from_param(&param) {
            Some(err) => Self::Error(err),
            None => Self::Ok(param),
        }
    }

    /// `true` for [`Reply::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Convert to a `Result`, keeping the device error as the error value.
    pub fn into_result(self) -> std::result::Result<Bytes, DeviceError> {
        match self {
            Self::Ok(param) => Ok(param),
            Self::Error(err) => Err(err),
        }
    }
}

/// Send one command and read its response (blocking).
///
/// The command is written and flushed before anything is read. A response
/// echoing a different body means request and response are no longer
/// paired up, which is fatal for the stream.
pub fn send_command<S: Read + Write + ?Sized>(
    stream: &mut S,
    body: Body,
    param: impl Into<Bytes>,
) -> Result<Reply> {
    let command = Command::new(body, param)?;
    write_command(stream, &command)?;

    let response = decode_response(stream, b"")?;
    if response.body != body {
        return Err(FrameError::BodyMismatch {
            expected: body.to_string(),
            actual: response.body.to_string(),
        });
    }

    let reply = Reply::classify(response.param);
    match &reply {
        Reply::Ok(param) => debug!(%body, param_len = param.len(), "command accepted"),
        Reply::Error(err) => debug!(%body, code = err.code(), "command rejected by projector"),
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::body::{INPT, POWR};

    /// Replays canned input and records what was written.
    struct Scripted {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
        flushes: usize,
    }

    impl Scripted {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                written: Vec::new(),
                flushes: 0,
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn normal_replies() {
        let mut stream = Scripted::new(b"%1POWR=ON\r");
        let reply = send_command(&mut stream, POWR, &b"ON"[..]).unwrap();
        assert_eq!(reply, Reply::Ok(Bytes::from_static(b"ON")));
        assert_eq!(stream.written, b"%1POWR ON\r");
        assert_eq!(stream.flushes, 1);

        let mut stream = Scripted::new(b"%1INPT=VGA1\r");
        let reply = send_command(&mut stream, INPT, &b"VGA1"[..]).unwrap();
        assert_eq!(reply, Reply::Ok(Bytes::from_static(b"VGA1")));
    }

    #[test]
    fn error_replies() {
        let cases = [
            (&b"%1INPT=ERR1\r"[..], "undefined command"),
            (&b"%1INPT=ERR2\r"[..], "out of parameter"),
            (&b"%1INPT=ERR3\r"[..], "unavailable time"),
            (&b"%1INPT=ERR4\r"[..], "projector failure"),
        ];

        for (wire, message) in cases {
            let mut stream = Scripted::new(wire);
            let reply = send_command(&mut stream, INPT, &b"VGA1"[..]).unwrap();
            assert!(!reply.is_ok());
            let err = reply.into_result().unwrap_err();
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn lowercase_echo_matches() {
        let mut stream = Scripted::new(b"%1powr=1\r");
        let reply = send_command(&mut stream, POWR, &b"?"[..]).unwrap();
        assert_eq!(reply.into_result().unwrap().as_ref(), b"1");
    }

    #[test]
    fn body_mismatch_is_fatal() {
        let mut stream = Scripted::new(b"%1INPT=11\r");
        let err = send_command(&mut stream, POWR, &b"?"[..]).unwrap_err();
        assert!(matches!(err, FrameError::BodyMismatch { .. }));
    }

    #[test]
    fn oversized_param_sends_nothing() {
        let mut stream = Scripted::new(b"");
        let err = send_command(&mut stream, INPT, vec![b'1'; 129]).unwrap_err();
        assert!(matches!(err, FrameError::ParamTooLong { .. }));
        assert!(stream.written.is_empty());
        assert_eq!(stream.flushes, 0);
    }

    #[test]
    fn closed_stream_reports_connection_closed() {
        let mut stream = Scripted::new(b"");
        let err = send_command(&mut stream, POWR, &b"?"[..]).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }
}
