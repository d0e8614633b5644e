use std::fmt;

use crate::error::{ProjectorError, Result};

/// Supplies the projector password, on demand.
///
/// The source is consulted only when the projector's greeting asks for
/// authentication, so interactive sources never prompt for projectors that
/// do not need a password.
pub trait PasswordSource {
    fn password(&mut self) -> Result<String>;
}

impl<F> PasswordSource for F
where
    F: FnMut() -> Result<String>,
{
    fn password(&mut self) -> Result<String> {
        self()
    }
}

/// A fixed password.
///
/// Treated as credential material: its `Debug` output is redacted.
#[derive(Clone)]
pub struct StaticPassword(String);

impl StaticPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl PasswordSource for StaticPassword {
    fn password(&mut self) -> Result<String> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticPassword")
            .field(&format_args!("<redacted:{} bytes>", self.0.len()))
            .finish()
    }
}

/// No password available. Fails with [`ProjectorError::PasswordRequired`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPassword;

impl PasswordSource for NoPassword {
    fn password(&mut self) -> Result<String> {
        Err(ProjectorError::PasswordRequired)
    }
}
