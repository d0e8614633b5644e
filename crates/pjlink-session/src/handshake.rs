//! Connection greeting and password authentication.
//!
//! On connect the projector sends `PJLINK 0\r` (no authentication) or
//! `PJLINK 1 <salt>\r`. In the second case the client answers with the
//! lowercase hex MD5 of salt + password, followed immediately by its first
//! command; the projector either answers that command or sends
//! `PJLINK ERRA\r` and stops processing.

use std::io::{Read, Write};

use bytes::BytesMut;
use md5::{Digest, Md5};
use pjlink_frame::{
    decode_response, read_up_to, write_all_flush, Command, DeviceError, FrameError, HEADER_SIZE,
    POWR,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ProjectorError, Result};
use crate::password::PasswordSource;

/// `PJLINK ` + flag + separator.
pub const GREETING_LEN: usize = 9;

/// Length of the random salt in an authenticated greeting.
pub const SALT_LEN: usize = 8;

/// Sent by the projector instead of a response when the digest is wrong.
pub const REJECTION: &[u8] = b"PJLINK ERRA\r";

const GREETING_MARKER: &[u8] = b"PJLINK ";
const GREETING_MARKER_LOWER: &[u8] = b"pjlink ";

/// What the projector's greeting asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    /// `PJLINK 0`: commands may be sent right away.
    NoAuth,
    /// `PJLINK 1 <salt>`: a digest must precede the first command.
    Auth { salt: [u8; SALT_LEN] },
}

/// Result of the authentication step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthOutcome {
    /// The projector did not ask for a password.
    NotRequired,
    /// The password was accepted.
    Accepted,
    /// The projector answered `PJLINK ERRA`; it will ignore further commands.
    Rejected,
}

impl AuthOutcome {
    pub fn is_rejected(self) -> bool {
        self == Self::Rejected
    }
}

/// Read and validate the connection greeting (blocking).
pub fn read_greeting<R: Read + ?Sized>(reader: &mut R) -> Result<Greeting> {
    let head = read_up_to(reader, GREETING_LEN)?;
    if head.is_empty() {
        return Err(FrameError::ConnectionClosed.into());
    }
    if head.len() < GREETING_LEN {
        return Err(invalid_greeting(&head));
    }

    let marker = &head[..GREETING_MARKER.len()];
    if marker != GREETING_MARKER && marker != GREETING_MARKER_LOWER {
        return Err(invalid_greeting(&head));
    }

    match (head[7], head[8]) {
        (b'0', b'\r') => Ok(Greeting::NoAuth),
        (b'1', b' ') => {
            let rest = read_up_to(reader, SALT_LEN + 1)?;
            if rest.len() != SALT_LEN + 1 || rest[SALT_LEN] != b'\r' {
                return Err(invalid_greeting(&[head, rest].concat()));
            }
            let mut salt = [0u8; SALT_LEN];
            salt.copy_from_slice(&rest[..SALT_LEN]);
            Ok(Greeting::Auth { salt })
        }
        _ => Err(invalid_greeting(&head)),
    }
}

/// Lowercase hex MD5 of `salt` followed by the UTF-8 password.
pub fn password_digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Run the greeting and, if asked for, the password exchange (blocking).
///
/// `password` is consulted only when the projector requires it. The digest
/// and a `POWR ?` probe are written as a single unit; a `PJLINK ERRA` reply
/// yields [`AuthOutcome::Rejected`], which is not an error. An `ERRn` reply
/// to the probe is returned as [`ProjectorError::Device`].
pub fn authenticate<S: Read + Write + ?Sized>(
    stream: &mut S,
    password: &mut dyn PasswordSource,
) -> Result<AuthOutcome> {
    let salt = match read_greeting(stream)? {
        Greeting::NoAuth => {
            debug!("projector does not require authentication");
            return Ok(AuthOutcome::NotRequired);
        }
        Greeting::Auth { salt } => salt,
    };
    debug!("projector requires authentication");

    let secret = password.password()?;
    let digest = password_digest(&salt, &secret);

    let probe = Command::query(POWR);
    let mut out = BytesMut::with_capacity(digest.len() + probe.wire_size());
    out.extend_from_slice(digest.as_bytes());
    probe.encode(&mut out);
    write_all_flush(stream, &out)?;

    let head = read_up_to(stream, HEADER_SIZE)?;
    if head == GREETING_MARKER {
        let tail = read_up_to(stream, REJECTION.len() - HEADER_SIZE)?;
        let reply = [head, tail].concat();
        if reply != REJECTION {
            return Err(ProjectorError::Protocol(format!(
                "unexpected reply to authentication: {:?}",
                String::from_utf8_lossy(&reply)
            )));
        }
        warn!("projector rejected the password");
        return Ok(AuthOutcome::Rejected);
    }

    let response = decode_response(stream, &head)?;
    if response.body != POWR {
        return Err(FrameError::BodyMismatch {
            expected: POWR.to_string(),
            actual: response.body.to_string(),
        }
        .into());
    }
    if let Some(err) = DeviceError::from_param(&response.param) {
        return Err(err.into());
    }

    info!("authenticated with projector");
    Ok(AuthOutcome::Accepted)
}

fn invalid_greeting(raw: &[u8]) -> ProjectorError {
    ProjectorError::Protocol(format!(
        "invalid greeting: {:?}",
        String::from_utf8_lossy(raw)
    ))
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;
    use crate::password::{NoPassword, StaticPassword};

    /// Reads from a script, records writes and flushes.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        flushes: usize,
    }

    impl Duplex {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
                flushes: 0,
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn digest_matches_known_values() {
        assert_eq!(
            password_digest(b"ABCDEFGH", "foobar"),
            "1b43fa5d29e41a573b40aaa5f6e527a3"
        );
        assert_eq!(
            password_digest(b"498e4a67", "JBMIAProjectorLink"),
            "5d8409bc1c3fa39749434aa3a5c38682"
        );
    }

    #[test]
    fn greeting_without_auth() {
        assert_eq!(
            read_greeting(&mut Cursor::new(b"PJLINK 0\r")).unwrap(),
            Greeting::NoAuth
        );
        assert_eq!(
            read_greeting(&mut Cursor::new(b"pjlink 0\r")).unwrap(),
            Greeting::NoAuth
        );
    }

    #[test]
    fn greeting_with_salt() {
        assert_eq!(
            read_greeting(&mut Cursor::new(b"PJLINK 1 ABCDEFGH\r")).unwrap(),
            Greeting::Auth { salt: *b"ABCDEFGH" }
        );
    }

    #[test]
    fn malformed_greetings() {
        fn greeting(raw: &[u8]) -> Result<Greeting> {
            read_greeting(&mut Cursor::new(raw.to_vec()))
        }

        assert!(matches!(
            greeting(b""),
            Err(ProjectorError::Frame(FrameError::ConnectionClosed))
        ));
        for raw in [
            &b"PJLINK"[..],
            b"PJLINK 2\r",
            b"PJLink 0\r",
            b"HELLO 0\r\r",
            b"PJLINK 0 ",
            b"PJLINK 1ABCDEFGH\r",
            b"PJLINK 1 ABCD\r",
            b"PJLINK 1 ABCDEFGH ",
        ] {
            assert!(
                matches!(greeting(raw), Err(ProjectorError::Protocol(_))),
                "{:?}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn no_auth_writes_nothing_and_skips_password() {
        let mut stream = Duplex::new(b"PJLINK 0\r");
        let mut asked = false;
        let mut source = || -> Result<String> {
            asked = true;
            Ok("unused".to_string())
        };

        let outcome = authenticate(&mut stream, &mut source).unwrap();
        assert_eq!(outcome, AuthOutcome::NotRequired);
        assert!(stream.output.is_empty());
        assert_eq!(stream.flushes, 0);
        drop(source);
        assert!(!asked);
    }

    #[test]
    fn auth_sends_digest_and_probe_as_one_unit() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\r%1POWR=0\r");
        let outcome = authenticate(&mut stream, &mut StaticPassword::new("foobar")).unwrap();

        assert_eq!(outcome, AuthOutcome::Accepted);
        assert_eq!(stream.output, b"1b43fa5d29e41a573b40aaa5f6e527a3%1POWR ?\r");
        assert_eq!(stream.flushes, 1);
    }

    #[test]
    fn rejected_password() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\rPJLINK ERRA\r");
        let outcome = authenticate(&mut stream, &mut StaticPassword::new("wrong")).unwrap();

        assert!(outcome.is_rejected());
        assert!(stream
            .output
            .starts_with(b"aae2d022528480776b39af693ece4f10"));
    }

    #[test]
    fn garbled_rejection_is_protocol_error() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\rPJLINK ERRB\r");
        let err = authenticate(&mut stream, &mut StaticPassword::new("x")).unwrap_err();
        assert!(matches!(err, ProjectorError::Protocol(_)));
    }

    #[test]
    fn device_error_on_probe() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\r%1POWR=ERR3\r");
        let err = authenticate(&mut stream, &mut StaticPassword::new("foobar")).unwrap_err();
        assert!(matches!(
            err,
            ProjectorError::Device(DeviceError::UnavailableTime)
        ));
    }

    #[test]
    fn probe_reply_for_other_body() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\r%1INPT=11\r");
        let err = authenticate(&mut stream, &mut StaticPassword::new("foobar")).unwrap_err();
        assert!(matches!(
            err,
            ProjectorError::Frame(FrameError::BodyMismatch { .. })
        ));
    }

    #[test]
    fn missing_password_writes_nothing() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\r");
        let err = authenticate(&mut stream, &mut NoPassword).unwrap_err();
        assert!(matches!(err, ProjectorError::PasswordRequired));
        assert!(stream.output.is_empty());
    }

    #[test]
    fn connection_closed_after_digest() {
        let mut stream = Duplex::new(b"PJLINK 1 ABCDEFGH\r");
        let err = authenticate(&mut stream, &mut StaticPassword::new("foobar")).unwrap_err();
        assert!(matches!(
            err,
            ProjectorError::Frame(FrameError::ConnectionClosed)
        ));
    }
}
