//! Build plan compiler
//!
//! Stage layout:
//!
//! ```text
//! 0 environment   image + repositories + packages
//! 1 sources       0 + source tree copied to /src
//! 2 build         1 + synthesized script
//! 3 manifest      scratch + APKBUILD
//! 4 packages      0, /work <- 3 (rw), /input <- 2 (ro), abuild -> /out
//! ```

use crate::build_plan::{
    BuildPlan, Mount, MountSource, Stage, StageBase, StageId, StageOperation, StageRole,
};
use crate::catalog::PipelineCatalog;
use crate::environment::install_script;
use crate::manifest::{render_apkbuild, APKBUILD};
use crate::script::{PipelineScript, ScriptSynthesizer};
use crate::substitute::Substitution;
use apkforge_config::{fixed_paths, CompilerConfig};
use apkforge_errors::{Error, PreconditionError};
use apkforge_types::Spec;
use std::collections::BTreeMap;
use std::sync::Arc;

const MANIFEST_MODE: u32 = 0o644;

/// Caller-supplied source tree, materialized by the execution engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    name: String,
}

impl SourceTree {
    pub const DEFAULT_NAME: &'static str = "context";

    /// The default build context
    #[must_use]
    pub fn context() -> Self {
        Self::named(Self::DEFAULT_NAME)
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// First named source context declared by `spec`, else the default
    #[must_use]
    pub fn for_spec(spec: &Spec) -> Self {
        spec.sources
            .values()
            .filter_map(|source| source.context.as_ref())
            .map(|context| context.name.trim())
            .find(|name| !name.is_empty())
            .map_or_else(Self::context, Self::named)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for SourceTree {
    fn default() -> Self {
        Self::context()
    }
}

/// Compiles specs into build plans
#[derive(Debug, Clone)]
pub struct PlanCompiler {
    catalog: Arc<PipelineCatalog>,
    substitution: Substitution,
    config: CompilerConfig,
}

impl PlanCompiler {
    /// Compiler over the bundled catalog
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid builder account, or an internal
    /// error if the substitution engine cannot be built.
    pub fn new(config: CompilerConfig) -> Result<Self, Error> {
        Self::with_catalog(Arc::new(PipelineCatalog::bundled()), config)
    }

    /// Compiler sharing an existing catalog and its cache
    ///
    /// # Errors
    ///
    /// Same as [`PlanCompiler::new`].
    pub fn with_catalog(
        catalog: Arc<PipelineCatalog>,
        config: CompilerConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            catalog,
            substitution: Substitution::new()?,
            config,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<PipelineCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Synthesize only the build script
    ///
    /// # Errors
    ///
    /// Returns the first step error, see [`ScriptSynthesizer::synthesize`].
    pub fn synthesize(&self, spec: &Spec) -> Result<PipelineScript, Error> {
        ScriptSynthesizer::new(&self.catalog, &self.substitution).synthesize(spec)
    }

    /// Compile `spec` into a five-stage plan over `source`
    ///
    /// # Errors
    ///
    /// Returns a precondition error for missing metadata, then any script
    /// synthesis error. No stage is built when either fails.
    pub fn compile(&self, spec: &Spec, source: &SourceTree) -> Result<BuildPlan, Error> {
        check_preconditions(spec)?;
        let script = self.synthesize(spec)?;
        tracing::debug!(
            package = %spec.name,
            steps = spec.pipeline.len(),
            needs = ?script.needs(),
            "synthesized build script"
        );

        let environment = StageId(0);
        let sources = StageId(1);
        let build = StageId(2);
        let manifest = StageId(3);

        let stages = vec![
            Stage {
                id: environment,
                role: StageRole::EnvironmentSetup,
                name: "install build environment".to_string(),
                base: StageBase::Image(self.config.base_image.clone()),
                operation: run(install_script(spec, script.needs()), "/", BTreeMap::new()),
                mounts: Vec::new(),
                output: "environment".to_string(),
                export: None,
            },
            Stage {
                id: sources,
                role: StageRole::SourceMaterialization,
                name: format!("copy source tree {}", source.name()),
                base: StageBase::Stage(environment),
                operation: StageOperation::Copy {
                    from: MountSource::Source(source.name().to_string()),
                    src: "/".to_string(),
                    dest: fixed_paths::SOURCE_DIR.to_string(),
                },
                mounts: Vec::new(),
                output: "sources".to_string(),
                export: None,
            },
            Stage {
                id: build,
                role: StageRole::BuildExecution,
                name: format!("build {}-{}", spec.name, spec.version),
                base: StageBase::Stage(sources),
                operation: run(
                    script.into_string(),
                    &build_workdir(spec),
                    BTreeMap::from([("PREFIX".to_string(), spec.build.install_dir.clone())]),
                ),
                mounts: Vec::new(),
                output: "build".to_string(),
                export: None,
            },
            Stage {
                id: manifest,
                role: StageRole::Packaging,
                name: format!("write {APKBUILD}"),
                base: StageBase::Scratch,
                operation: StageOperation::MkFile {
                    path: format!("/{APKBUILD}"),
                    mode: MANIFEST_MODE,
                    contents: render_apkbuild(spec),
                },
                mounts: Vec::new(),
                output: "manifest".to_string(),
                export: None,
            },
            Stage {
                id: StageId(4),
                role: StageRole::Signing,
                name: "build and sign apk".to_string(),
                base: StageBase::Stage(environment),
                operation: run(self.signing_script(), "/", BTreeMap::new()),
                mounts: vec![
                    Mount {
                        target: fixed_paths::WORK_DIR.to_string(),
                        from: MountSource::Stage(manifest),
                        readonly: false,
                    },
                    Mount {
                        target: fixed_paths::INPUT_DIR.to_string(),
                        from: MountSource::Stage(build),
                        readonly: true,
                    },
                ],
                output: "packages".to_string(),
                export: Some(fixed_paths::RESULT_DIR.to_string()),
            },
        ];

        tracing::info!(package = %spec.name, version = %spec.version, "compiled build plan");
        Ok(BuildPlan::new(stages))
    }

    /// Run abuild as the unprivileged builder user and collect the apks
    fn signing_script(&self) -> String {
        let user = &self.config.builder_user;
        let group = &self.config.builder_group;
        let work = fixed_paths::WORK_DIR;
        let out = fixed_paths::RESULT_DIR;
        let keys = fixed_paths::APK_KEYS_DIR;

        format!(
            "set -e\n\
             adduser -D {user}\n\
             addgroup {user} {group}\n\
             mkdir -p {out}\n\
             chown -R {user}:{user} {work} {out}\n\
             su {user} -s /bin/sh -c 'abuild-keygen -an'\n\
             cp /home/{user}/.abuild/*.rsa.pub {keys}/\n\
             su {user} -s /bin/sh -c 'cd {work} && abuild -r && find ~/packages -name \"*.apk\" -exec cp {{}} {out} \\;'\n"
        )
    }
}

fn run(script: String, workdir: &str, env: BTreeMap<String, String>) -> StageOperation {
    StageOperation::Run {
        script,
        workdir: workdir.to_string(),
        env,
    }
}

fn build_workdir(spec: &Spec) -> String {
    match spec.build.source_dir.as_deref() {
        Some(dir) => format!(
            "{}/{}",
            fixed_paths::SOURCE_DIR,
            dir.trim_start_matches('/')
        ),
        None => "/".to_string(),
    }
}

/// Required metadata, checked in this order
fn check_preconditions(spec: &Spec) -> Result<(), PreconditionError> {
    let fields = [
        ("name", &spec.name),
        ("version", &spec.version),
        ("description", &spec.description),
        ("url", &spec.url),
        ("license", &spec.license),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(PreconditionError::MissingField {
            field: (*field).to_string(),
        });
    }

    if let Some(dir) = spec.build.source_dir.as_deref() {
        if dir.split('/').any(|component| component == "..") {
            return Err(PreconditionError::EscapingPath {
                field: "build.source_dir".to_string(),
                value: dir.to_string(),
            });
        }
    }
    Ok(())
}
