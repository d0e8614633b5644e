//! In-process fake projector for tests.
//!
//! [`FakeSession`] is an in-memory byte stream that behaves like a projector
//! connection: it greets, checks the password digest, and answers commands
//! from a [`FakeProjector`] state. Written bytes are only processed on
//! `flush()` or when a read finds nothing buffered, so a client that forgets
//! to flush shows up as a stalled exchange.
//!
//! [`serve_one`] exposes the same session over a loopback TCP listener for
//! end-to-end tests.

use std::collections::{HashMap, VecDeque};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pjlink_frame::{
    Body, DeviceError, AVMT, ERST, INF1, INF2, INFO, INPT, INST, LAMP, NAME, POWR, QUERY,
};
use tracing::{debug, warn};

use crate::handshake::{password_digest, REJECTION, SALT_LEN};
use crate::types::{
    inputs_to_param, ErrorReport, Input, InputSource, Lamp, MuteState, MuteTarget, PowerState,
};

const DIGEST_LEN: usize = 32;
const OK: &[u8] = b"OK";

/// How the fake greets a new connection.
#[derive(Clone)]
pub enum FakeAuth {
    /// `PJLINK 0`.
    None,
    /// `PJLINK 1 <salt>`, expecting the digest of `password`.
    Password {
        password: String,
        salt: [u8; SALT_LEN],
    },
}

impl FakeAuth {
    /// Require `password`, with a fixed salt.
    pub fn password(password: impl Into<String>) -> Self {
        Self::Password {
            password: password.into(),
            salt: *b"ABCDEFGH",
        }
    }
}

/// Projector state behind a fake session.
#[derive(Debug, Clone)]
pub struct FakeProjector {
    pub name: String,
    pub manufacturer: String,
    pub product_name: String,
    pub other_info: String,
    pub power: PowerState,
    pub input: Input,
    pub mute: MuteState,
    pub lamps: Vec<Lamp>,
    pub inputs: Vec<Input>,
    pub errors: ErrorReport,
    raw_replies: HashMap<Body, Vec<u8>>,
}

impl Default for FakeProjector {
    fn default() -> Self {
        let input = |source, number| Input { source, number };
        let mut inputs = vec![
            input(InputSource::Rgb, 1),
            input(InputSource::Rgb, 2),
            input(InputSource::Video, 1),
        ];
        inputs.extend((1..=9).map(|n| input(InputSource::Digital, n)));
        // Numbered out of sequence on purpose.
        inputs.push(input(InputSource::Network, 5));

        Self {
            name: "FakeProjector".to_string(),
            manufacturer: "flowblok".to_string(),
            product_name: "python pjlink".to_string(),
            other_info: "testing".to_string(),
            power: PowerState::Off,
            input: input(InputSource::Rgb, 1),
            mute: MuteState::default(),
            lamps: vec![Lamp::new(42, false)],
            inputs,
            errors: ErrorReport::default(),
            raw_replies: HashMap::new(),
        }
    }
}

impl FakeProjector {
    /// Answer every `body` command with `reply` verbatim, whatever the
    /// parameter. Used to feed malformed replies to the client.
    pub fn set_raw_reply(&mut self, body: Body, reply: impl Into<Vec<u8>>) {
        self.raw_replies.insert(body, reply.into());
    }

    /// Produce the reply parameter for one command.
    pub fn handle(&mut self, body: Body, param: &[u8]) -> Vec<u8> {
        if let Some(raw) = self.raw_replies.get(&body) {
            return raw.clone();
        }

        match body {
            POWR => self.handle_power(param),
            INPT => self.handle_input(param),
            AVMT => self.handle_mute(param),
            ERST => query_only(param, || self.errors.to_param().to_vec()),
            LAMP => query_only(param, || Lamp::list_to_param(&self.lamps).into_bytes()),
            INST => query_only(param, || inputs_to_param(&self.inputs)),
            NAME => query_only(param, || self.name.clone().into_bytes()),
            INF1 => query_only(param, || self.manufacturer.clone().into_bytes()),
            INF2 => query_only(param, || self.product_name.clone().into_bytes()),
            INFO => query_only(param, || self.other_info.clone().into_bytes()),
            _ => device_error(DeviceError::UndefinedCommand),
        }
    }

    fn handle_power(&mut self, param: &[u8]) -> Vec<u8> {
        match param {
            QUERY => vec![self.power.code()],
            b"1" => {
                if self.power == PowerState::Off {
                    self.power = PowerState::WarmUp;
                }
                OK.to_vec()
            }
            b"0" => {
                if self.power == PowerState::On {
                    self.power = PowerState::Cooling;
                }
                OK.to_vec()
            }
            _ => device_error(DeviceError::OutOfParameter),
        }
    }

    fn handle_input(&mut self, param: &[u8]) -> Vec<u8> {
        if param == QUERY {
            return self.input.to_param().to_vec();
        }
        match Input::from_param(param) {
            Ok(input) => {
                self.input = input;
                OK.to_vec()
            }
            Err(_) => device_error(DeviceError::OutOfParameter),
        }
    }

    fn handle_mute(&mut self, param: &[u8]) -> Vec<u8> {
        if param == QUERY {
            return self.mute.to_param().to_vec();
        }

        let [selector, state] = param else {
            return device_error(DeviceError::OutOfParameter);
        };
        let target = match selector {
            b'1'..=b'3' => MuteTarget::from_bits(selector - b'0'),
            _ => return device_error(DeviceError::OutOfParameter),
        };
        let muted = match state {
            b'0' => false,
            b'1' => true,
            _ => return device_error(DeviceError::OutOfParameter),
        };

        match target {
            Ok(MuteTarget::Video) => self.mute.video = muted,
            Ok(MuteTarget::Audio) => self.mute.audio = muted,
            Ok(MuteTarget::All) => {
                self.mute.video = muted;
                self.mute.audio = muted;
            }
            Err(_) => return device_error(DeviceError::OutOfParameter),
        }
        OK.to_vec()
    }
}

fn query_only(param: &[u8], answer: impl FnOnce() -> Vec<u8>) -> Vec<u8> {
    if param == QUERY {
        answer()
    } else {
        device_error(DeviceError::OutOfParameter)
    }
}

fn device_error(err: DeviceError) -> Vec<u8> {
    err.code().as_bytes().to_vec()
}

/// An in-memory projector connection.
pub struct FakeSession {
    device: FakeProjector,
    pending: Vec<u8>,
    outgoing: VecDeque<u8>,
    expected_digest: Option<String>,
    locked: bool,
    received: Vec<u8>,
    flushes: usize,
}

impl FakeSession {
    pub fn new(device: FakeProjector, auth: FakeAuth) -> Self {
        let (greeting, expected_digest) = match auth {
            FakeAuth::None => (b"PJLINK 0\r".to_vec(), None),
            FakeAuth::Password { password, salt } => {
                let mut greeting = b"PJLINK 1 ".to_vec();
                greeting.extend_from_slice(&salt);
                greeting.push(b'\r');
                (greeting, Some(password_digest(&salt, &password)))
            }
        };

        Self {
            device,
            pending: Vec::new(),
            outgoing: greeting.into(),
            expected_digest,
            locked: false,
            received: Vec::new(),
            flushes: 0,
        }
    }

    pub fn device(&self) -> &FakeProjector {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut FakeProjector {
        &mut self.device
    }

    pub fn into_device(self) -> FakeProjector {
        self.device
    }

    /// Every byte the client has written.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Number of `flush()` calls seen.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Whether a wrong digest put the fake into lockdown.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Drain everything queued for the client.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.outgoing.drain(..).collect()
    }

    fn process(&mut self) {
        if let Some(expected) = &self.expected_digest {
            if self.pending.len() < DIGEST_LEN {
                return;
            }
            let digest: Vec<u8> = self.pending.drain(..DIGEST_LEN).collect();
            if digest != expected.as_bytes() {
                debug!("fake projector: wrong digest, locking down");
                self.locked = true;
                self.outgoing.extend(REJECTION);
            }
            self.expected_digest = None;
        }

        if self.locked {
            return;
        }

        while let Some(end) = self.pending.iter().position(|b| *b == b'\r') {
            let mut line: Vec<u8> = self.pending.drain(..=end).collect();
            line.pop();
            self.answer(&line);
        }
    }

    fn answer(&mut self, line: &[u8]) {
        let [b'%', b'1', b0, b1, b2, b3, b' ', param @ ..] = line else {
            warn!(
                line = %String::from_utf8_lossy(line),
                "fake projector: ignoring malformed command"
            );
            return;
        };
        let raw_body = [*b0, *b1, *b2, *b3];

        let reply = match Body::new(&raw_body) {
            Ok(body) => self.device.handle(body, param),
            Err(_) => device_error(DeviceError::UndefinedCommand),
        };

        self.outgoing.extend(b"%1");
        self.outgoing.extend(raw_body);
        self.outgoing.push_back(b'=');
        self.outgoing.extend(reply);
        self.outgoing.push_back(b'\r');
    }
}

impl Read for FakeSession {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.outgoing.len() < buf.len() {
            self.process();
        }
        let n = buf.len().min(self.outgoing.len());
        for (slot, byte) in buf.iter_mut().zip(self.outgoing.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for FakeSession {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.received.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        self.process();
        Ok(())
    }
}

/// A fake projector serving a single TCP connection on loopback.
pub struct FakeServer {
    addr: SocketAddr,
    handle: JoinHandle<io::Result<FakeProjector>>,
}

impl FakeServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `host:port` form accepted by the command line.
    pub fn target(&self) -> String {
        self.addr.to_string()
    }

    /// Wait for the connection to close and return the final state.
    pub fn join(self) -> io::Result<FakeProjector> {
        self.handle
            .join()
            .map_err(|_| io::Error::other("fake projector thread panicked"))?
    }
}

/// Accept one connection on an ephemeral loopback port and serve it from
/// `device` until the client hangs up.
pub fn serve_one(device: FakeProjector, auth: FakeAuth) -> io::Result<FakeServer> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let handle = thread::spawn(move || -> io::Result<FakeProjector> {
        let (mut stream, _) = listener.accept()?;
        stream.set_read_timeout(Some(Duration::from_secs(10)))?;
        let mut session = FakeSession::new(device, auth);
        let mut buf = [0u8; 1024];

        loop {
            let out = session.take_output();
            if !out.is_empty() {
                stream.write_all(&out)?;
            }

            let n = match stream.read(&mut buf) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::ConnectionReset => 0,
                Err(err) => return Err(err),
            };
            if n == 0 {
                break;
            }
            session.write_all(&buf[..n])?;
            session.flush()?;
        }

        Ok(session.into_device())
    });

    Ok(FakeServer { addr, handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greets_and_answers_after_flush() {
        let mut session = FakeSession::new(FakeProjector::default(), FakeAuth::None);
        assert_eq!(session.take_output(), b"PJLINK 0\r");

        session.write_all(b"%1POWR ?\r").unwrap();
        assert!(session.take_output().is_empty());

        session.flush().unwrap();
        assert_eq!(session.take_output(), b"%1POWR=0\r");
    }

    #[test]
    fn unknown_body_and_bad_params() {
        let mut session = FakeSession::new(FakeProjector::default(), FakeAuth::None);
        session.take_output();

        session
            .write_all(b"%1CLSS ?\r%1ERST 1\r%1AVMT 40\r%1INPT 10\r")
            .unwrap();
        session.flush().unwrap();
        assert_eq!(
            session.take_output(),
            b"%1CLSS=ERR1\r%1ERST=ERR2\r%1AVMT=ERR2\r%1INPT=ERR2\r"
        );
    }

    #[test]
    fn wrong_digest_locks_down() {
        let mut session =
            FakeSession::new(FakeProjector::default(), FakeAuth::password("foobar"));
        assert_eq!(session.take_output(), b"PJLINK 1 ABCDEFGH\r");

        session.write_all(&[b'0'; 32]).unwrap();
        session.write_all(b"%1POWR ?\r").unwrap();
        session.flush().unwrap();
        assert!(session.is_locked());
        assert_eq!(session.take_output(), REJECTION);

        session.write_all(b"%1POWR ?\r").unwrap();
        session.flush().unwrap();
        assert!(session.take_output().is_empty());
    }

    #[test]
    fn serves_over_tcp() {
        let server = serve_one(FakeProjector::default(), FakeAuth::None).unwrap();
        let mut client = std::net::TcpStream::connect(server.addr()).unwrap();

        let mut greeting = [0u8; 9];
        client.read_exact(&mut greeting).unwrap();
        assert_eq!(&greeting, b"PJLINK 0\r");

        client.write_all(b"%1POWR 1\r").unwrap();
        let mut reply = [0u8; 10];
        client.read_exact(&mut reply).unwrap();
        assert_eq!(&reply, b"%1POWR=OK\r");
        drop(client);

        let device = server.join().unwrap();
        assert_eq!(device.power, PowerState::WarmUp);
    }
}
