use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use pjlink_session::{
    connect_with_config, ConnectConfig, InputSource, MuteTarget, PasswordSource, PowerState,
    Projector, StaticPassword,
};
use pjlink_transport::BufStream;
use tracing::debug;

use crate::config;
use crate::exit::{projector_error, CliError, CliResult, PERMISSION_DENIED, SUCCESS, USAGE};
use crate::output::OutputFormat;
use crate::prompt::PromptPassword;

pub mod errors;
pub mod info;
pub mod input;
pub mod inputs;
pub mod lamps;
pub mod mute;
pub mod power;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the power state, or switch the projector on or off.
    Power(PowerArgs),
    /// Show the selected input, or switch input.
    Input(InputArgs),
    /// Show the mute state, or mute video, audio or both.
    Mute(MuteArgs),
    /// Show the mute state, or unmute video, audio or both.
    Unmute(MuteArgs),
    /// Show fan, lamp, temperature, cover, filter and other error status.
    Errors,
    /// Show lamp hours and on/off state.
    Lamps,
    /// List the inputs the projector offers.
    Inputs,
    /// Show the projector name, manufacturer, product name and other info.
    Info,
    /// Show version information.
    Version(VersionArgs),
}

/// How to reach and authenticate with the projector.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Projector: `host:port`, or a name from the config file.
    #[arg(short = 'p', long, value_name = "PROJECTOR", global = true)]
    pub projector: Option<String>,

    /// Config file with named projectors.
    #[arg(long, value_name = "PATH", env = "PJLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Projector password. Prompted for when needed and not configured.
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "PJLINK_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// Connect and I/O timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    /// Desired state. Omit to show the current state.
    pub state: Option<PowerSwitch>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PowerSwitch {
    On,
    Off,
}

impl From<PowerSwitch> for PowerState {
    fn from(switch: PowerSwitch) -> Self {
        match switch {
            PowerSwitch::On => PowerState::On,
            PowerSwitch::Off => PowerState::Off,
        }
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Source: RGB, VIDEO, DIGITAL, STORAGE or NETWORK. Omit to show the
    /// current input.
    #[arg(value_parser = parse_source)]
    pub source: Option<InputSource>,

    /// Input number.
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub number: u8,
}

#[derive(Args, Debug)]
pub struct MuteArgs {
    /// What to (un)mute. Omit to show the current state.
    #[arg(value_parser = parse_mute_target)]
    pub target: Option<MuteTarget>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}

fn parse_source(value: &str) -> Result<InputSource, String> {
    value.parse().map_err(|_| {
        format!("invalid source '{value}' (expected RGB, VIDEO, DIGITAL, STORAGE or NETWORK)")
    })
}

fn parse_mute_target(value: &str) -> Result<MuteTarget, String> {
    value
        .parse()
        .map_err(|_| format!("invalid target '{value}' (expected video, audio or all)"))
}

pub fn run(command: Command, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Power(args) => power::run(args, connect, format),
        Command::Input(args) => input::run(args, connect, format),
        Command::Mute(args) => mute::run(args, true, connect, format),
        Command::Unmute(args) => mute::run(args, false, connect, format),
        Command::Errors => errors::run(connect, format),
        Command::Lamps => lamps::run(connect, format),
        Command::Inputs => inputs::run(connect, format),
        Command::Info => info::run(connect, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connect, authenticate and run `action` on the session.
///
/// A rejected password prints `Incorrect password.` and exits with
/// [`PERMISSION_DENIED`] without running `action`.
pub fn with_projector<F>(connect: &ConnectArgs, context: &str, action: F) -> CliResult<i32>
where
    F: FnOnce(&mut Projector<BufStream>) -> pjlink_session::Result<()>,
{
    let target = config::resolve(connect.projector.as_deref(), connect.config.as_deref())?;
    let timeout = parse_timeout(&connect.timeout)?;
    debug!(?target, ?timeout, "resolved projector");

    let stored = connect
        .password
        .clone()
        .filter(|p| !p.is_empty())
        .or(target.password);
    let mut password: Box<dyn PasswordSource> = match stored {
        Some(password) => Box::new(StaticPassword::new(password)),
        None => Box::new(PromptPassword),
    };

    let mut conn = connect_with_config(
        &target.host,
        target.port,
        &ConnectConfig::uniform(timeout),
        password.as_mut(),
    )
    .map_err(|err| projector_error("connect failed", err))?;

    if conn.is_locked() {
        eprintln!("Incorrect password.");
        return Ok(PERMISSION_DENIED);
    }

    action(&mut conn.projector).map_err(|err| projector_error(context, err))?;
    Ok(SUCCESS)
}

pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_seconds() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_timeout_millis() {
        assert_eq!(parse_timeout("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_timeout_invalid() {
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("bad").is_err());
        assert!(parse_timeout("").is_err());
    }

    #[test]
    fn source_names_are_exact() {
        assert_eq!(parse_source("VIDEO").unwrap(), InputSource::Video);
        assert!(parse_source("video").is_err());
    }
}
