use std::io::{self, BufRead, Write};

use pjlink_session::{PasswordSource, ProjectorError};

/// Asks for the password on stderr and reads one line from stdin.
///
/// Only consulted when the projector demands a password. A closed stdin
/// means no password is available.
#[derive(Debug, Default)]
pub struct PromptPassword;

impl PasswordSource for PromptPassword {
    fn password(&mut self) -> pjlink_session::Result<String> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(b"Password: ")?;
        stderr.flush()?;

        read_password_line(&mut io::stdin().lock())
    }
}

fn read_password_line<R: BufRead>(input: &mut R) -> pjlink_session::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ProjectorError::PasswordRequired);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
