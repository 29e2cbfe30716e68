//! Placeholder substitution for pipeline scripts
//!
//! Templates reference three scopes:
//!
//! - `${{package.name}}`, `${{package.version}}` - spec metadata
//! - `${{targets.contextdir}}` - the fixed package output directory
//! - `${{inputs.<name>}}` - resolved step inputs
//!
//! Scopes are expanded in that order. Input placeholders that name an input
//! the pipeline does not declare are removed afterwards so the emitted shell
//! never contains a literal `${{`, which `sh` rejects as a bad substitution.

use crate::inputs::ResolvedInputs;
use apkforge_config::fixed_paths;
use apkforge_errors::Error;
use apkforge_types::Spec;
use regex::Regex;

pub const PACKAGE_NAME: &str = "${{package.name}}";
pub const PACKAGE_VERSION: &str = "${{package.version}}";
pub const TARGET_CONTEXTDIR: &str = "${{targets.contextdir}}";

const INPUT_PLACEHOLDER_PATTERN: &str = r"\$\{\{inputs\.[^}]+\}\}";

/// Render the placeholder for input `name`
#[must_use]
pub fn input_placeholder(name: &str) -> String {
    format!("${{{{inputs.{name}}}}}")
}

/// Replace package metadata placeholders
#[must_use]
pub fn substitute_package(text: &str, spec: &Spec) -> String {
    text.replace(PACKAGE_NAME, &spec.name)
        .replace(PACKAGE_VERSION, &spec.version)
}

/// Compiled substitution engine
#[derive(Debug, Clone)]
pub struct Substitution {
    leftover: Regex,
}

impl Substitution {
    /// Build the engine
    ///
    /// # Errors
    ///
    /// Returns an internal error if the leftover-placeholder pattern fails to
    /// compile.
    pub fn new() -> Result<Self, Error> {
        let leftover = Regex::new(INPUT_PLACEHOLDER_PATTERN)
            .map_err(|e| Error::internal(format!("failed to compile placeholder pattern: {e}")))?;
        Ok(Self { leftover })
    }

    /// Expand every scope in `template`
    #[must_use]
    pub fn substitute(&self, template: &str, inputs: &ResolvedInputs, spec: &Spec) -> String {
        let mut script = substitute_package(template, spec);
        script = script.replace(TARGET_CONTEXTDIR, fixed_paths::OUTPUT_DIR);
        for (name, value) in inputs {
            script = script.replace(&input_placeholder(name), value);
        }
        self.strip_unresolved(&script)
    }

    /// Delete input placeholders that survived substitution
    #[must_use]
    pub fn strip_unresolved(&self, script: &str) -> String {
        for leftover in self.leftover.find_iter(script) {
            tracing::debug!(
                placeholder = leftover.as_str(),
                "dropping placeholder for undeclared input"
            );
        }
        self.leftover.replace_all(script, "").into_owned()
    }
}
