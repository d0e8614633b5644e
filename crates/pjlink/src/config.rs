//! Projector target resolution.
//!
//! `-p host:port` addresses a projector directly. Anything else names a
//! table in the TOML config file:
//!
//! ```toml
//! [default]
//! host = "192.0.2.10"
//!
//! [lobby]
//! host = "lobby-projector.example"
//! port = 4352
//! password = "secret"
//! ```
//!
//! A name with no table (or no config file at all) is used as a bare host
//! name on the default port.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pjlink_transport::DEFAULT_PORT;
use serde::Deserialize;
use tracing::debug;

use crate::exit::{io_error, CliError, CliResult, USAGE};

const DEFAULT_SECTION: &str = "default";

/// Where to connect, and the stored password if any.
#[derive(Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Target");
        dbg.field("host", &self.host).field("port", &self.port);
        if let Some(password) = &self.password {
            dbg.field(
                "password",
                &format_args!("<redacted:{} bytes>", password.len()),
            );
        } else {
            dbg.field("password", &Option::<String>::None);
        }
        dbg.finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectorEntry {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    password: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// The config file used when `--config` and `$PJLINK_CONFIG` are unset.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("pjlink").join("pjlink.toml"))
}

/// Resolve `-p` (if given) against the config file at `config`.
pub fn resolve(projector: Option<&str>, config: Option<&Path>) -> CliResult<Target> {
    if let Some((host, port)) = projector.and_then(|p| p.rsplit_once(':')) {
        return direct(host, port);
    }

    let path = config.map(Path::to_path_buf).or_else(default_config_path);
    let entries = match &path {
        Some(path) => load(path)?,
        None => None,
    };

    let section = projector.unwrap_or(DEFAULT_SECTION);
    if let Some(entry) = entries.and_then(|mut entries| entries.remove(section)) {
        debug!(section, host = %entry.host, port = entry.port, "projector from config");
        return Ok(Target {
            host: entry.host,
            port: entry.port,
            password: entry.password.filter(|p| !p.is_empty()),
        });
    }

    match projector {
        Some(host) => Ok(Target {
            host: host.to_string(),
            port: DEFAULT_PORT,
            password: None,
        }),
        None => Err(CliError::new(
            USAGE,
            format!(
                "no default projector defined in {}",
                path.as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "the config file".to_string())
            ),
        )),
    }
}

fn direct(host: &str, port: &str) -> CliResult<Target> {
    let port: u16 = port
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid port: {port}")))?;
    // `[::1]:4352` style addresses.
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(CliError::new(USAGE, "projector host must not be empty"));
    }
    Ok(Target {
        host: host.to_string(),
        port,
        password: None,
    })
}

/// `Ok(None)` when the file does not exist.
fn load(path: &Path) -> CliResult<Option<BTreeMap<String, ProjectorEntry>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_error(&format!("failed reading {}", path.display()), err)),
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|err| CliError::new(USAGE, format!("invalid config {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn host_port_is_direct() {
        let target = resolve(Some("127.0.0.1:5000"), None).unwrap();
        assert_eq!(target.host, "127.0.0.1");
        assert_eq!(target.port, 5000);
        assert!(target.password.is_none());

        let target = resolve(Some("[::1]:4352"), None).unwrap();
        assert_eq!(target.host, "::1");
    }

    #[test]
    fn bad_port_is_usage_error() {
        let err = resolve(Some("host:notaport"), None).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn named_section() {
        let file = config(
            "[default]\nhost = \"10.0.0.1\"\n\n[lobby]\nhost = \"10.0.0.2\"\nport = 4353\npassword = \"secret\"\n",
        );

        let target = resolve(Some("lobby"), Some(file.path())).unwrap();
        assert_eq!(target.host, "10.0.0.2");
        assert_eq!(target.port, 4353);
        assert_eq!(target.password.as_deref(), Some("secret"));

        let target = resolve(None, Some(file.path())).unwrap();
        assert_eq!(target.host, "10.0.0.1");
        assert_eq!(target.port, DEFAULT_PORT);
        assert!(target.password.is_none());
    }

    #[test]
    fn empty_password_means_none() {
        let file = config("[default]\nhost = \"h\"\npassword = \"\"\n");
        assert!(resolve(None, Some(file.path())).unwrap().password.is_none());
    }

    #[test]
    fn unknown_name_is_bare_host() {
        let file = config("[default]\nhost = \"10.0.0.1\"\n");
        let target = resolve(Some("projector.local"), Some(file.path())).unwrap();
        assert_eq!(target.host, "projector.local");
        assert_eq!(target.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let target = resolve(Some("projector.local"), Some(&path)).unwrap();
        assert_eq!(target.host, "projector.local");

        let err = resolve(None, Some(&path)).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("absent.toml"));
    }

    #[test]
    fn invalid_toml_is_usage_error() {
        let file = config("[default]\nhost = \n");
        assert_eq!(resolve(None, Some(file.path())).unwrap_err().code, USAGE);
    }

    #[test]
    fn debug_redacts_password() {
        let target = Target {
            host: "h".into(),
            port: 1,
            password: Some("hunter2".into()),
        };
        let dbg = format!("{target:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted:7 bytes>"));
    }
}
