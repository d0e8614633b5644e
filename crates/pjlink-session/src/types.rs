//! Domain values carried in PJLink parameters.
//!
//! Each type owns both directions of its wire mapping so the client and the
//! test fixture agree on a single table.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ProjectorError, Result};

/// Maximum lamps reported by `LAMP`.
pub const MAX_LAMPS: usize = 8;

/// Maximum entries reported by `INST`.
pub const MAX_INPUTS: usize = 50;

/// Advisory length of the `NAME` reply in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Advisory length of the `INF1`, `INF2` and `INFO` replies in bytes.
pub const MAX_INFO_LEN: usize = 32;

/// Video bit of the mute selector.
pub const MUTE_VIDEO: u8 = 1;

/// Audio bit of the mute selector.
pub const MUTE_AUDIO: u8 = 2;

/// Power state reported by `POWR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerState {
    Off,
    On,
    Cooling,
    WarmUp,
}

impl PowerState {
    pub const ALL: [PowerState; 4] = [Self::Off, Self::On, Self::Cooling, Self::WarmUp];

    /// The wire digit.
    pub fn code(self) -> u8 {
        match self {
            Self::Off => b'0',
            Self::On => b'1',
            Self::Cooling => b'2',
            Self::WarmUp => b'3',
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Cooling => "cooling",
            Self::WarmUp => "warm-up",
        }
    }

    /// Decode a `POWR` reply.
    pub fn from_param(param: &[u8]) -> Result<Self> {
        let state = match param {
            [code] => Self::from_code(*code),
            _ => None,
        };
        state.ok_or_else(|| ProjectorError::undecodable("power state", param))
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ProjectorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ProjectorError::InvalidArgument(format!("invalid power state: {s}")))
    }
}

/// Input source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputSource {
    Rgb,
    Video,
    Digital,
    Storage,
    Network,
}

impl InputSource {
    pub const ALL: [InputSource; 5] = [
        Self::Rgb,
        Self::Video,
        Self::Digital,
        Self::Storage,
        Self::Network,
    ];

    /// The wire digit.
    pub fn code(self) -> u8 {
        match self {
            Self::Rgb => b'1',
            Self::Video => b'2',
            Self::Digital => b'3',
            Self::Storage => b'4',
            Self::Network => b'5',
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Video => "VIDEO",
            Self::Digital => "DIGITAL",
            Self::Storage => "STORAGE",
            Self::Network => "NETWORK",
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputSource {
    type Err = ProjectorError;

    /// Source names are matched exactly (`RGB`, not `rgb`).
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ProjectorError::InvalidArgument(format!("invalid source: {s}")))
    }
}

/// An input: source kind plus a number in 1..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Input {
    pub source: InputSource,
    pub number: u8,
}

impl Input {
    /// Validate an input selection.
    pub fn new(source: InputSource, number: u8) -> Result<Self> {
        if !(1..=9).contains(&number) {
            return Err(ProjectorError::InvalidArgument(format!(
                "number should be 1-9: {number}"
            )));
        }
        Ok(Self { source, number })
    }

    /// The 2-byte wire form.
    pub fn to_param(self) -> [u8; 2] {
        [self.source.code(), b'0' + self.number]
    }

    /// Decode a 2-byte token.
    pub fn from_param(param: &[u8]) -> Result<Self> {
        let [source, number] = param else {
            return Err(ProjectorError::undecodable("input", param));
        };
        let source = InputSource::from_code(*source)
            .ok_or_else(|| ProjectorError::undecodable("input source", param))?;
        if !(b'1'..=b'9').contains(number) {
            return Err(ProjectorError::undecodable("input number", param));
        }
        Ok(Self {
            source,
            number: number - b'0',
        })
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.number)
    }
}

/// Which stream a mute command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MuteTarget {
    Video,
    Audio,
    All,
}

impl MuteTarget {
    /// Build from a [`MUTE_VIDEO`] / [`MUTE_AUDIO`] bitmask.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            MUTE_VIDEO => Ok(Self::Video),
            MUTE_AUDIO => Ok(Self::Audio),
            b if b == MUTE_VIDEO | MUTE_AUDIO => Ok(Self::All),
            other => Err(ProjectorError::InvalidArgument(format!(
                "invalid mute selector: {other}"
            ))),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Video => MUTE_VIDEO,
            Self::Audio => MUTE_AUDIO,
            Self::All => MUTE_VIDEO | MUTE_AUDIO,
        }
    }

    /// The `AVMT` set parameter.
    pub fn to_param(self, muted: bool) -> [u8; 2] {
        [b'0' + self.bits(), if muted { b'1' } else { b'0' }]
    }
}

impl FromStr for MuteTarget {
    type Err = ProjectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "all" => Ok(Self::All),
            other => Err(ProjectorError::InvalidArgument(format!(
                "invalid mute target: {other}"
            ))),
        }
    }
}

/// Audio/video mute state reported by `AVMT ?`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MuteState {
    pub video: bool,
    pub audio: bool,
}

impl MuteState {
    pub fn new(video: bool, audio: bool) -> Self {
        Self { video, audio }
    }

    /// The query reply code.
    pub fn to_param(self) -> [u8; 2] {
        match (self.video, self.audio) {
            (true, false) => *b"11",
            (false, true) => *b"21",
            (true, true) => *b"31",
            (false, false) => *b"30",
        }
    }

    /// Decode a query reply. Only `11`, `21`, `31` and `30` are defined.
    pub fn from_param(param: &[u8]) -> Result<Self> {
        match param {
            b"11" => Ok(Self::new(true, false)),
            b"21" => Ok(Self::new(false, true)),
            b"31" => Ok(Self::new(true, true)),
            b"30" => Ok(Self::new(false, false)),
            _ => Err(ProjectorError::undecodable("mute state", param)),
        }
    }
}

/// Severity of one subsystem in `ERST`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    #[default]
    Ok,
    Warning,
    Error,
}

impl ErrorLevel {
    pub const ALL: [ErrorLevel; 3] = [Self::Ok, Self::Warning, Self::Error];

    pub fn code(self) -> u8 {
        match self {
            Self::Ok => b'0',
            Self::Warning => b'1',
            Self::Error => b'2',
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-subsystem error status, in `ERST` wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorReport {
    pub fan: ErrorLevel,
    pub lamp: ErrorLevel,
    pub temperature: ErrorLevel,
    pub cover: ErrorLevel,
    pub filter: ErrorLevel,
    pub other: ErrorLevel,
}

impl ErrorReport {
    /// Subsystem names in wire order.
    pub const SUBSYSTEMS: [&'static str; 6] =
        ["fan", "lamp", "temperature", "cover", "filter", "other"];

    fn levels(&self) -> [ErrorLevel; 6] {
        [
            self.fan,
            self.lamp,
            self.temperature,
            self.cover,
            self.filter,
            self.other,
        ]
    }

    /// `(subsystem, level)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ErrorLevel)> {
        Self::SUBSYSTEMS.into_iter().zip(self.levels())
    }

    /// Mutable access by subsystem name.
    pub fn get_mut(&mut self, subsystem: &str) -> Option<&mut ErrorLevel> {
        match subsystem {
            "fan" => Some(&mut self.fan),
            "lamp" => Some(&mut self.lamp),
            "temperature" => Some(&mut self.temperature),
            "cover" => Some(&mut self.cover),
            "filter" => Some(&mut self.filter),
            "other" => Some(&mut self.other),
            _ => None,
        }
    }

    pub fn to_param(&self) -> [u8; 6] {
        self.levels().map(ErrorLevel::code)
    }

    /// Decode an `ERST` reply. The reply must be exactly 6 digits.
    pub fn from_param(param: &[u8]) -> Result<Self> {
        let digits: &[u8; 6] = param
            .try_into()
            .map_err(|_| ProjectorError::undecodable("error status", param))?;

        let mut levels = [ErrorLevel::Ok; 6];
        for (level, code) in levels.iter_mut().zip(digits) {
            *level = ErrorLevel::from_code(*code)
                .ok_or_else(|| ProjectorError::undecodable("error status", param))?;
        }

        let [fan, lamp, temperature, cover, filter, other] = levels;
        Ok(Self {
            fan,
            lamp,
            temperature,
            cover,
            filter,
            other,
        })
    }
}

/// One lamp from `LAMP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Lamp {
    /// Cumulative lighting time in hours.
    pub hours: u64,
    pub on: bool,
}

impl Lamp {
    pub fn new(hours: u64, on: bool) -> Self {
        Self { hours, on }
    }

    /// Decode a `LAMP` reply: space-separated `hours flag` pairs.
    pub fn list_from_param(param: &[u8]) -> Result<Vec<Self>> {
        let text = std::str::from_utf8(param)
            .map_err(|_| ProjectorError::undecodable("lamp list", param))?;
        let tokens: Vec<&str> = text.split(' ').collect();
        if tokens.len() % 2 != 0 || tokens.len() > 2 * MAX_LAMPS {
            return Err(ProjectorError::undecodable("lamp list", param));
        }

        tokens
            .chunks_exact(2)
            .map(|pair| {
                let hours = parse_hours(pair[0])
                    .ok_or_else(|| ProjectorError::undecodable("lamp hours", param))?;
                let on = match pair[1] {
                    "0" => false,
                    "1" => true,
                    _ => return Err(ProjectorError::undecodable("lamp state", param)),
                };
                Ok(Self { hours, on })
            })
            .collect()
    }

    pub fn list_to_param(lamps: &[Self]) -> String {
        lamps
            .iter()
            .map(|lamp| format!("{} {}", lamp.hours, u8::from(lamp.on)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn parse_hours(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Decode an `INST` reply: space-separated 2-byte input tokens.
///
/// An empty reply is an empty list.
pub fn inputs_from_param(param: &[u8]) -> Result<Vec<Input>> {
    if param.is_empty() {
        return Ok(Vec::new());
    }

    let tokens: Vec<&[u8]> = param.split(|b| *b == b' ').collect();
    if tokens.len() > MAX_INPUTS {
        return Err(ProjectorError::undecodable("input list", param));
    }
    tokens.into_iter().map(Input::from_param).collect()
}

pub fn inputs_to_param(inputs: &[Input]) -> Vec<u8> {
    let mut out = Vec::with_capacity(inputs.len() * 3);
    for (i, input) in inputs.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        out.extend_from_slice(&input.to_param());
    }
    out
}

/// The four identity strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectorInfo {
    pub name: String,
    pub manufacturer: String,
    pub product_name: String,
    pub other_info: String,
}
