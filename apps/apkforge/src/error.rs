//! CLI error rendering

use apkforge_errors::{Error, UserFacingError};
use std::fmt;

/// Wraps a library error for display on stderr
#[derive(Debug)]
pub struct CliError(pub Error);

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err = &self.0;
        write!(f, "{}", err.user_message())?;
        if let Error::Io {
            path: Some(path), ..
        } = err
        {
            write!(f, " ({})", path.display())?;
        }
        if let Some(code) = err.user_code() {
            write!(f, "\n  Code: {code}")?;
        }
        if let Some(hint) = err.user_hint() {
            write!(f, "\n  Hint: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<Error> for CliError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}
