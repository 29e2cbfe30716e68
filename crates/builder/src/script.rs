//! Build script synthesis
//!
//! Turns the spec's ordered pipeline steps into one `sh` script. Inline
//! steps are copied verbatim; catalog steps are resolved, validated and
//! substituted. Each fragment ends with exactly one newline.

use crate::catalog::{PipelineCatalog, PipelineDef};
use crate::inputs;
use crate::substitute::Substitution;
use apkforge_config::fixed_paths;
use apkforge_errors::{Error, SchemaError};
use apkforge_types::{PipelineStep, Spec, StepKind};
use serde::Serialize;
use std::sync::Arc;

/// A synthesized build script and the packages its pipelines need
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineScript {
    text: String,
    needs: Vec<String>,
}

impl PipelineScript {
    /// Script text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Packages required by referenced pipelines, first-seen order, no repeats
    #[must_use]
    pub fn needs(&self) -> &[String] {
        &self.needs
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Resolves pipeline steps against a catalog
#[derive(Debug, Clone, Copy)]
pub struct ScriptSynthesizer<'a> {
    catalog: &'a PipelineCatalog,
    substitution: &'a Substitution,
}

impl<'a> ScriptSynthesizer<'a> {
    #[must_use]
    pub fn new(catalog: &'a PipelineCatalog, substitution: &'a Substitution) -> Self {
        Self {
            catalog,
            substitution,
        }
    }

    /// Build the full script for `spec`
    ///
    /// # Errors
    ///
    /// Fails on the first invalid step: an empty pipeline, a step with both
    /// or neither of `run`/`uses`, an unknown pipeline, or arguments that do
    /// not match the pipeline's inputs.
    pub fn synthesize(&self, spec: &Spec) -> Result<PipelineScript, Error> {
        if spec.pipeline.is_empty() {
            return Err(SchemaError::NoBuildSteps.into());
        }

        let mut text = format!("set -e\nmkdir -p {}\n", fixed_paths::OUTPUT_DIR);
        let mut needs: Vec<String> = Vec::new();

        for (index, step) in spec.pipeline.iter().enumerate() {
            let (fragment, def) = self.render_step(spec, step, index + 1)?;
            if let Some(def) = def {
                for package in &def.needs.packages {
                    if !needs.contains(package) {
                        needs.push(package.clone());
                    }
                }
            }
            push_fragment(&mut text, &fragment);
        }

        Ok(PipelineScript { text, needs })
    }

    /// Resolve a single step into its script fragment
    ///
    /// `position` is the step's 1-based index, used in error messages.
    ///
    /// # Errors
    ///
    /// Same per-step failures as [`ScriptSynthesizer::synthesize`].
    pub fn resolve_step(
        &self,
        spec: &Spec,
        step: &PipelineStep,
        position: usize,
    ) -> Result<String, Error> {
        self.render_step(spec, step, position)
            .map(|(fragment, _)| fragment)
    }

    fn render_step(
        &self,
        spec: &Spec,
        step: &PipelineStep,
        position: usize,
    ) -> Result<(String, Option<Arc<PipelineDef>>), Error> {
        match step.kind(position)? {
            StepKind::Inline(script) => {
                tracing::trace!(step = position, "inline step");
                Ok((script.to_string(), None))
            }
            StepKind::Uses { name, with } => {
                let def = self.catalog.resolve(name)?;
                let resolved = inputs::resolve(&def, with, spec, position)?;
                tracing::debug!(step = position, pipeline = name, "resolved pipeline step");
                let fragment = self.substitution.substitute(&def.runs, &resolved, spec);
                Ok((fragment, Some(def)))
            }
        }
    }
}

/// Append `fragment`, adding a newline only if it does not already end in one
///
/// Trailing spaces and tabs are ignored when looking for the newline.
pub fn push_fragment(script: &mut String, fragment: &str) {
    script.push_str(fragment);
    if !fragment.trim_end_matches([' ', '\t']).ends_with('\n') {
        script.push('\n');
    }
}
