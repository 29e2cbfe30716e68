//! Spec metadata preconditions

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PreconditionError {
    #[error("spec {field} is required")]
    MissingField { field: String },

    #[error("spec {field} must stay inside the source tree: {value:?}")]
    EscapingPath { field: String, value: String },
}

impl UserFacingError for PreconditionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { .. } => {
                Some("Fill in the package metadata at the top of the spec.")
            }
            Self::EscapingPath { .. } => {
                Some("Use a path relative to the source tree without `..`.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { .. } => Some("precondition.missing_field"),
            Self::EscapingPath { .. } => Some("precondition.escaping_path"),
        }
    }
}
