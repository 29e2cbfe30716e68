//! Step argument validation and input resolution

use crate::catalog::PipelineDef;
use crate::substitute::substitute_package;
use apkforge_errors::ValidationError;
use apkforge_types::{ArgValue, Spec};
use std::collections::BTreeMap;

/// Final input name -> value mapping for one step
pub type ResolvedInputs = BTreeMap<String, String>;

/// Check `args` against the pipeline's input schema
///
/// `step` is the 1-based position of the step in the spec.
///
/// # Errors
///
/// Returns an error for the first unknown argument, or the first required
/// input that is absent or blank (both in sorted name order).
pub fn validate_args(
    def: &PipelineDef,
    args: &BTreeMap<String, ArgValue>,
    step: usize,
) -> Result<(), ValidationError> {
    if let Some(key) = args.keys().find(|key| !def.inputs.contains_key(*key)) {
        return Err(ValidationError::UnknownInput {
            step,
            pipeline: def.id.clone(),
            key: key.clone(),
            allowed: def.input_names().map(str::to_string).collect(),
        });
    }

    for (name, input) in &def.inputs {
        if !input.required {
            continue;
        }
        match args.get(name) {
            None => {
                return Err(ValidationError::MissingInput {
                    step,
                    pipeline: def.id.clone(),
                    input: name.clone(),
                })
            }
            Some(value) if value.is_blank() => {
                return Err(ValidationError::BlankInput {
                    step,
                    pipeline: def.id.clone(),
                    input: name.clone(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Merge schema defaults with caller arguments
///
/// Every declared input appears in the result. Caller values win over
/// defaults. Both have package metadata placeholders expanded, so a default
/// like `${{package.name}}` renders the same as if the caller had passed it.
#[must_use]
pub fn merge_inputs(
    def: &PipelineDef,
    args: &BTreeMap<String, ArgValue>,
    spec: &Spec,
) -> ResolvedInputs {
    let mut resolved: ResolvedInputs = def
        .inputs
        .iter()
        .map(|(name, input)| {
            let default = input.default.as_deref().unwrap_or_default();
            (name.clone(), substitute_package(default, spec))
        })
        .collect();

    for (name, value) in args {
        resolved.insert(name.clone(), substitute_package(&value.to_text(), spec));
    }

    resolved
}

/// Validate then resolve the inputs of one step
///
/// # Errors
///
/// Returns the validation error from [`validate_args`].
pub fn resolve(
    def: &PipelineDef,
    args: &BTreeMap<String, ArgValue>,
    spec: &Spec,
    step: usize,
) -> Result<ResolvedInputs, ValidationError> {
    validate_args(def, args, step)?;
    Ok(merge_inputs(def, args, spec))
}
