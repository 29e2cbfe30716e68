//! Declarative package build spec
//!
//! A spec is a YAML document describing one package: metadata, the build
//! environment, sources and an ordered list of pipeline steps. Specs are
//! loaded once per compile and never mutated afterwards.

use crate::ArgValue;
use apkforge_errors::{Error, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Install prefix used when `build.install_dir` is absent or empty
pub const DEFAULT_INSTALL_DIR: &str = "/usr";

/// Complete build spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Release counter, rendered as `pkgrel`
    #[serde(default, deserialize_with = "deserialize_epoch")]
    pub epoch: u32,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub license: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copyright: Vec<Copyright>,

    #[serde(default)]
    pub dependencies: Dependencies,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, Source>,

    #[serde(default)]
    pub pipeline: Vec<PipelineStep>,

    #[serde(default)]
    pub build: Build,
}

/// Copyright / attestation entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Copyright {
    #[serde(default)]
    pub attestation: String,
    #[serde(default)]
    pub license: String,
}

/// Dependencies of the produced package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime: Vec<String>,
}

/// Build environment: repositories to enable and packages to preinstall
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub contents: EnvironmentContents,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentContents {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
}

/// A named source declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<SourceContext>,
}

/// Source taken from the caller-supplied build context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceContext {
    #[serde(default)]
    pub name: String,
}

/// Build output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    #[serde(default = "default_install_dir")]
    pub install_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
}

impl Default for Build {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            source_dir: None,
        }
    }
}

fn deserialize_epoch<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    u32::try_from(value).map_err(|_| {
        serde::de::Error::custom(format!(
            "epoch must be a non-negative integer no larger than {}, got {value}",
            u32::MAX
        ))
    })
}

fn default_install_dir() -> String {
    DEFAULT_INSTALL_DIR.to_string()
}

/// One entry of the spec's `pipeline` list
///
/// Exactly one of `run` and `uses` has to be set. This is not enforced at
/// parse time; [`PipelineStep::kind`] reports the violation with the step's
/// position when the pipeline is compiled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub with: BTreeMap<String, ArgValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

/// What a pipeline step asks for, once exclusivity has been checked
#[derive(Debug, Clone, Copy)]
pub enum StepKind<'a> {
    /// Literal shell text
    Inline(&'a str),
    /// Reference to a catalog pipeline with its arguments
    Uses {
        name: &'a str,
        with: &'a BTreeMap<String, ArgValue>,
    },
}

impl PipelineStep {
    /// Inline script step
    #[must_use]
    pub fn run(script: impl Into<String>) -> Self {
        Self {
            run: Some(script.into()),
            ..Self::default()
        }
    }

    /// Catalog reference step
    #[must_use]
    pub fn uses(name: impl Into<String>, with: BTreeMap<String, ArgValue>) -> Self {
        Self {
            uses: Some(name.into()),
            with,
            run: None,
        }
    }

    /// Classify the step. `position` is the 1-based index used in errors.
    ///
    /// A `run` made only of whitespace counts as unset.
    ///
    /// # Errors
    ///
    /// Returns a schema error when both or neither of `run` and `uses` are set.
    pub fn kind(&self, position: usize) -> Result<StepKind<'_>, SchemaError> {
        let run = self.run.as_deref().filter(|s| !s.trim().is_empty());
        let uses = self.uses.as_deref().filter(|s| !s.is_empty());
        match (run, uses) {
            (Some(_), Some(_)) => Err(SchemaError::ConflictingStep { step: position }),
            (None, None) => Err(SchemaError::EmptyStep { step: position }),
            (Some(script), None) => Ok(StepKind::Inline(script)),
            (None, Some(name)) => Ok(StepKind::Uses {
                name,
                with: &self.with,
            }),
        }
    }
}

impl Spec {
    /// Parse a spec from YAML text and run the defaulting pass
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid spec document.
    pub fn from_yaml_str(content: &str) -> Result<Self, Error> {
        let mut spec: Spec = serde_yml::from_str(content).map_err(|e| SchemaError::SpecParse {
            message: e.to_string(),
        })?;
        spec.apply_defaults();
        Ok(spec)
    }

    /// Parse a spec from raw bytes (the form the invocation layer hands over)
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not UTF-8 or not a valid spec.
    pub fn from_yaml_bytes(data: &[u8]) -> Result<Self, Error> {
        let content = std::str::from_utf8(data).map_err(|e| SchemaError::SpecParse {
            message: format!("spec is not valid UTF-8: {e}"),
        })?;
        Self::from_yaml_str(content)
    }

    /// Fill every optional field that has a documented default
    ///
    /// Serde defaults cover absent keys; this also covers keys that are
    /// present but empty (`install_dir: ""`), so downstream code never has to
    /// reinterpret an unset value.
    pub fn apply_defaults(&mut self) {
        if self.build.install_dir.trim().is_empty() {
            self.build.install_dir = default_install_dir();
        }
        if self
            .build
            .source_dir
            .as_deref()
            .is_some_and(|dir| dir.trim().is_empty())
        {
            self.build.source_dir = None;
        }
    }
}
