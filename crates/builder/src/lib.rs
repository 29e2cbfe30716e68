#![deny(clippy::pedantic, unsafe_code)]
//! Build plan compiler for apk packages
//!
//! Turns a declarative [`Spec`](apkforge_types::Spec) into a [`BuildPlan`]:
//! a short chain of container stages that installs the build environment,
//! copies the sources, runs the synthesized build script, writes an APKBUILD
//! and finally runs `abuild` to produce signed packages.
//!
//! Build steps either inline shell or reference reusable pipelines from a
//! [`PipelineCatalog`]. Pipeline inputs are validated and substituted into
//! the pipeline's script template before the steps are concatenated.

mod build_plan;
pub mod catalog;
mod compiler;
pub mod environment;
pub mod inputs;
pub mod manifest;
mod script;
pub mod substitute;

pub use build_plan::{
    BuildPlan, Mount, MountSource, Stage, StageBase, StageId, StageOperation, StageRole,
};
pub use catalog::{InputDef, PipelineCatalog, PipelineDef, PipelineNeeds};
pub use compiler::{PlanCompiler, SourceTree};
pub use inputs::ResolvedInputs;
pub use script::{push_fragment, PipelineScript, ScriptSynthesizer};
pub use substitute::Substitution;
