//! Step argument validation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("pipeline step {step} ({pipeline}): unknown input {key:?} (allowed: {})", allowed.join(", "))]
    UnknownInput {
        step: usize,
        pipeline: String,
        key: String,
        allowed: Vec<String>,
    },

    #[error("pipeline step {step} ({pipeline}): required input {input:?} is missing")]
    MissingInput {
        step: usize,
        pipeline: String,
        input: String,
    },

    #[error("pipeline step {step} ({pipeline}): required input {input:?} must not be empty")]
    BlankInput {
        step: usize,
        pipeline: String,
        input: String,
    },
}

impl ValidationError {
    /// Name of the input the error is about
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::UnknownInput { key, .. } => key,
            Self::MissingInput { input, .. } | Self::BlankInput { input, .. } => input,
        }
    }

    /// 1-based position of the offending step
    #[must_use]
    pub fn step(&self) -> usize {
        match self {
            Self::UnknownInput { step, .. }
            | Self::MissingInput { step, .. }
            | Self::BlankInput { step, .. } => *step,
        }
    }
}

impl UserFacingError for ValidationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownInput { .. } => Some("Remove the input or use one of the allowed names."),
            Self::MissingInput { .. } | Self::BlankInput { .. } => {
                Some("Supply the required input under the step's `with` block.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownInput { .. } => "validation.unknown_input",
            Self::MissingInput { .. } => "validation.missing_input",
            Self::BlankInput { .. } => "validation.blank_input",
        };
        Some(code)
    }
}
