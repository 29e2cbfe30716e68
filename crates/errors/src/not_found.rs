//! Lookup failures

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum NotFoundError {
    #[error("pipeline {name:?} not found")]
    Pipeline { name: String },
}

impl UserFacingError for NotFoundError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Pipeline { .. } => Some("Run `apkforge pipelines` to list available pipelines."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::Pipeline { .. } => Some("not_found.pipeline"),
        }
    }
}
