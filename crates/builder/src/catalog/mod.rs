//! Catalog of reusable pipeline definitions
//!
//! A pipeline is a named script template with an input schema. Definitions are
//! stored as YAML text and parsed the first time a spec references them; the
//! parsed definition is then shared for as long as the catalog lives.

mod bundled;

use apkforge_errors::{Error, NotFoundError, SchemaError};
use apkforge_types::ArgValue;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Schema for one named pipeline input
///
/// In YAML an input is either a bare scalar (its default) or an object
/// `{ description?, default?, required? }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInputDef")]
pub struct InputDef {
    pub description: Option<String>,
    pub default: Option<String>,
    pub required: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInputDef {
    Short(Option<ArgValue>),
    Long {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        default: Option<ArgValue>,
        #[serde(default)]
        required: bool,
    },
}

impl From<RawInputDef> for InputDef {
    fn from(raw: RawInputDef) -> Self {
        match raw {
            RawInputDef::Short(default) => Self {
                description: None,
                default: default.map(|v| v.to_text()),
                required: false,
            },
            RawInputDef::Long {
                description,
                default,
                required,
            } => Self {
                description,
                default: default.map(|v| v.to_text()),
                required,
            },
        }
    }
}

/// What a pipeline needs from the build environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineNeeds {
    #[serde(default)]
    pub packages: Vec<String>,
}

/// A parsed catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDef {
    /// Catalog name this definition was loaded under
    #[serde(skip)]
    pub id: String,

    /// Human readable title
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub needs: PipelineNeeds,

    #[serde(default)]
    pub inputs: BTreeMap<String, InputDef>,

    /// Script template
    #[serde(default)]
    pub runs: String,
}

impl PipelineDef {
    /// Parse a definition from YAML text
    ///
    /// # Errors
    ///
    /// Returns a schema error if the text is malformed or has no `runs`.
    pub fn parse(id: &str, content: &str) -> Result<Self, SchemaError> {
        let mut def: PipelineDef =
            serde_yml::from_str(content).map_err(|e| SchemaError::PipelineParse {
                name: id.to_string(),
                message: e.to_string(),
            })?;
        if def.runs.trim().is_empty() {
            return Err(SchemaError::MissingRuns {
                name: id.to_string(),
            });
        }
        def.id = id.to_string();
        Ok(def)
    }

    /// Declared input names in sorted order
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }
}

/// Lazily-parsed, cached pipeline registry
///
/// A single lock guards both the cache lookup and the fill, so a definition
/// is parsed at most once per catalog even when several compiles ask for it
/// at the same time.
#[derive(Debug)]
pub struct PipelineCatalog {
    sources: BTreeMap<String, Cow<'static, str>>,
    loaded: Mutex<HashMap<String, Arc<PipelineDef>>>,
}

impl PipelineCatalog {
    /// Catalog over the definitions shipped with this crate
    #[must_use]
    pub fn bundled() -> Self {
        Self::with_sources(
            bundled::BUNDLED
                .iter()
                .map(|(name, text)| ((*name).to_string(), Cow::Borrowed(*text))),
        )
    }

    /// Catalog over caller-provided definitions (name, YAML text)
    pub fn from_sources<I, K, V>(sources: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_sources(
            sources
                .into_iter()
                .map(|(name, text)| (name.into(), Cow::Owned(text.into()))),
        )
    }

    fn with_sources(sources: impl Iterator<Item = (String, Cow<'static, str>)>) -> Self {
        Self {
            sources: sources.collect(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// All addressable pipeline names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Number of definitions parsed so far
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.lock().map_or(0, |loaded| loaded.len())
    }

    /// Look up a pipeline by exact name, parsing it on first use
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown names and a schema error when
    /// the stored definition cannot be parsed. Failed parses are not cached.
    pub fn resolve(&self, name: &str) -> Result<Arc<PipelineDef>, Error> {
        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| Error::internal("pipeline catalog lock poisoned"))?;

        if let Some(def) = loaded.get(name) {
            tracing::trace!(pipeline = name, "pipeline cache hit");
            return Ok(Arc::clone(def));
        }

        let content = self
            .sources
            .get(name)
            .ok_or_else(|| NotFoundError::Pipeline {
                name: name.to_string(),
            })?;

        let def = Arc::new(PipelineDef::parse(name, content)?);
        tracing::debug!(
            pipeline = name,
            inputs = def.inputs.len(),
            "loaded pipeline definition"
        );
        loaded.insert(name.to_string(), Arc::clone(&def));
        Ok(def)
    }
}

impl Default for PipelineCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}
