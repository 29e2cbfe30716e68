//! Structural validation errors for specs and pipeline definitions

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("failed to parse spec: {message}")]
    SpecParse { message: String },

    #[error("pipeline {name:?}: {message}")]
    PipelineParse { name: String, message: String },

    #[error("pipeline {name:?}: missing runs")]
    MissingRuns { name: String },

    #[error("pipeline is required and must not be empty")]
    NoBuildSteps,

    #[error("pipeline step {step}: cannot set both 'uses' and 'run'")]
    ConflictingStep { step: usize },

    #[error("pipeline step {step}: must set either 'uses' or 'run'")]
    EmptyStep { step: usize },
}

impl UserFacingError for SchemaError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpecParse { .. } => Some("Check the spec file for YAML syntax errors."),
            Self::NoBuildSteps => Some("Add at least one `run` or `uses` step under `pipeline`."),
            Self::ConflictingStep { .. } | Self::EmptyStep { .. } => {
                Some("Each pipeline step needs exactly one of `run` or `uses`.")
            }
            Self::PipelineParse { .. } | Self::MissingRuns { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SpecParse { .. } => "schema.spec_parse",
            Self::PipelineParse { .. } => "schema.pipeline_parse",
            Self::MissingRuns { .. } => "schema.missing_runs",
            Self::NoBuildSteps => "schema.no_build_steps",
            Self::ConflictingStep { .. } => "schema.conflicting_step",
            Self::EmptyStep { .. } => "schema.empty_step",
        };
        Some(code)
    }
}
