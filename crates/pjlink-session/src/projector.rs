//! Typed command surface over an authenticated stream.

use std::fmt;
use std::io::{Read, Write};

use bytes::Bytes;
use pjlink_frame::{
    body_name, send_command, Body, Reply, AVMT, ERST, INF1, INF2, INFO, INPT, INST, LAMP, NAME,
    POWR, QUERY,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ProjectorError, Result};
use crate::handshake::{self, AuthOutcome};
use crate::password::PasswordSource;
use crate::types::{
    inputs_from_param, ErrorReport, Input, InputSource, Lamp, MuteState, MuteTarget, PowerState,
    ProjectorInfo, MAX_INFO_LEN, MAX_NAME_LEN,
};

/// Reply to a successful set command.
const SET_OK: &[u8] = b"OK";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// Connected, greeting not yet read.
    Unauthenticated,
    /// Greeting read, waiting on the password exchange.
    Authenticating,
    /// Commands may be sent.
    Ready,
    /// The password was rejected. Nothing more is sent.
    Locked,
    /// A fatal error left the stream out of sync. Nothing more is sent.
    Aborted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Locked => "locked",
            Self::Aborted => "aborted",
        })
    }
}

/// A PJLink class 1 session.
///
/// Owns the byte stream. Call [`Projector::authenticate`] once, then issue
/// commands; each command is one strictly sequential request/response
/// round trip.
pub struct Projector<S> {
    stream: S,
    state: SessionState,
}

impl<S> Projector<S> {
    /// Wrap a freshly connected stream. Nothing is read until
    /// [`Projector::authenticate`].
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Projector<S> {
    /// Read the greeting and authenticate if the projector asks for it.
    ///
    /// Allowed exactly once, on a fresh session. A rejected password locks
    /// the session but is reported as [`AuthOutcome::Rejected`], not as an
    /// error.
    pub fn authenticate(&mut self, password: &mut dyn PasswordSource) -> Result<AuthOutcome> {
        if self.state != SessionState::Unauthenticated {
            return Err(ProjectorError::InvalidState(format!(
                "authenticate called on a {} session",
                self.state
            )));
        }

        self.state = SessionState::Authenticating;
        match handshake::authenticate(&mut self.stream, password) {
            Ok(AuthOutcome::Rejected) => {
                self.state = SessionState::Locked;
                Ok(AuthOutcome::Rejected)
            }
            Ok(outcome) => {
                self.state = SessionState::Ready;
                Ok(outcome)
            }
            Err(err @ ProjectorError::Device(_)) => {
                // The digest was accepted; only the probe failed.
                self.state = SessionState::Ready;
                Err(err)
            }
            Err(err) => {
                self.state = SessionState::Aborted;
                Err(err)
            }
        }
    }

    /// Send `body` with `param` and return the reply parameter.
    ///
    /// `ERRn` replies become [`ProjectorError::Device`].
    pub fn request(&mut self, body: Body, param: impl Into<Bytes>) -> Result<Bytes> {
        self.ensure_ready()?;
        let result = send_command(&mut self.stream, body, param);
        match self.track(result.map_err(ProjectorError::from))? {
            Reply::Ok(param) => Ok(param),
            Reply::Error(err) => {
                debug!(body = body_name(body), code = err.code(), "device error");
                Err(err.into())
            }
        }
    }

    /// Query `body` with `?`.
    pub fn get(&mut self, body: Body) -> Result<Bytes> {
        self.request(body, QUERY)
    }

    /// Send a set command; the projector must answer `OK`.
    pub fn set(&mut self, body: Body, param: impl Into<Bytes>) -> Result<()> {
        let reply = self.request(body, param)?;
        if reply.as_ref() != SET_OK {
            return self.track(Err(ProjectorError::Protocol(format!(
                "{body} set answered {:?} instead of OK",
                String::from_utf8_lossy(&reply)
            ))));
        }
        Ok(())
    }

    pub fn get_power(&mut self) -> Result<PowerState> {
        let param = self.get(POWR)?;
        self.decode(PowerState::from_param(&param))
    }

    /// Switch power on or off.
    ///
    /// `cooling` and `warm-up` are reported states, not commands; they are
    /// rejected unless `force` is set, in which case the projector decides.
    pub fn set_power(&mut self, state: PowerState, force: bool) -> Result<()> {
        if !force && !matches!(state, PowerState::Off | PowerState::On) {
            return Err(ProjectorError::InvalidArgument(format!(
                "cannot set power to {state}"
            )));
        }
        self.set(POWR, vec![state.code()])
    }

    pub fn get_input(&mut self) -> Result<Input> {
        let param = self.get(INPT)?;
        self.decode(Input::from_param(&param))
    }

    pub fn set_input(&mut self, source: InputSource, number: u8) -> Result<()> {
        let input = Input::new(source, number)?;
        self.set(INPT, input.to_param().to_vec())
    }

    pub fn get_mute(&mut self) -> Result<MuteState> {
        let param = self.get(AVMT)?;
        self.decode(MuteState::from_param(&param))
    }

    pub fn set_mute(&mut self, target: MuteTarget, muted: bool) -> Result<()> {
        self.set(AVMT, target.to_param(muted).to_vec())
    }

    pub fn get_errors(&mut self) -> Result<ErrorReport> {
        let param = self.get(ERST)?;
        self.decode(ErrorReport::from_param(&param))
    }

    pub fn get_lamps(&mut self) -> Result<Vec<Lamp>> {
        let param = self.get(LAMP)?;
        self.decode(Lamp::list_from_param(&param))
    }

    pub fn get_inputs(&mut self) -> Result<Vec<Input>> {
        let param = self.get(INST)?;
        self.decode(inputs_from_param(&param))
    }

    /// Projector name (UTF-8).
    pub fn get_name(&mut self) -> Result<String> {
        let param = self.get(NAME)?;
        let name = self.decode(
            String::from_utf8(param.to_vec())
                .map_err(|_| ProjectorError::undecodable("name", &param)),
        )?;
        check_advisory_len(NAME, &name, MAX_NAME_LEN);
        Ok(name)
    }

    pub fn get_manufacturer(&mut self) -> Result<String> {
        self.get_ascii(INF1)
    }

    pub fn get_product_name(&mut self) -> Result<String> {
        self.get_ascii(INF2)
    }

    pub fn get_other_info(&mut self) -> Result<String> {
        self.get_ascii(INFO)
    }

    /// All four identity strings, queried in order.
    pub fn get_info(&mut self) -> Result<ProjectorInfo> {
        Ok(ProjectorInfo {
            name: self.get_name()?,
            manufacturer: self.get_manufacturer()?,
            product_name: self.get_product_name()?,
            other_info: self.get_other_info()?,
        })
    }

    fn get_ascii(&mut self, body: Body) -> Result<String> {
        let param = self.get(body)?;
        if !param.is_ascii() {
            return self.track(Err(ProjectorError::undecodable(body_name(body), &param)));
        }
        let text = String::from_utf8_lossy(&param).into_owned();
        check_advisory_len(body, &text, MAX_INFO_LEN);
        Ok(text)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Locked => Err(ProjectorError::Locked),
            state => Err(ProjectorError::InvalidState(format!(
                "command sent on a {state} session"
            ))),
        }
    }

    /// A reply that cannot be decoded means the session is out of step.
    fn decode<T>(&mut self, decoded: Result<T>) -> Result<T> {
        self.track(decoded)
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() && self.state == SessionState::Ready {
                warn!(error = %err, "aborting projector session");
                self.state = SessionState::Aborted;
            }
        }
        result
    }
}

impl<S> fmt::Debug for Projector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projector")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn check_advisory_len(body: Body, value: &str, max: usize) {
    if value.len() > max {
        warn!(
            body = body_name(body),
            len = value.len(),
            max,
            "reply longer than the protocol allows"
        );
    }
}
