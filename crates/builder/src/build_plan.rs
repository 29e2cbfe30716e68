//! Build plan representation handed to the execution engine

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Index of a stage within its plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StageId(pub usize);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a stage contributes to the package build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    EnvironmentSetup,
    SourceMaterialization,
    BuildExecution,
    Packaging,
    Signing,
}

impl StageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnvironmentSetup => "environment_setup",
            Self::SourceMaterialization => "source_materialization",
            Self::BuildExecution => "build_execution",
            Self::Packaging => "packaging",
            Self::Signing => "signing",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root filesystem a stage starts from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageBase {
    /// Container image reference
    Image(String),
    /// Empty filesystem
    Scratch,
    /// Result of an earlier stage
    Stage(StageId),
}

/// Where mounted or copied content comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MountSource {
    Stage(StageId),
    /// Caller-supplied source tree, by name
    Source(String),
}

/// A filesystem made visible to a stage's operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mount {
    pub target: String,
    pub from: MountSource,
    pub readonly: bool,
}

/// The single operation a stage performs on top of its base
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageOperation {
    /// Run `script` with `sh -c`
    Run {
        script: String,
        workdir: String,
        env: BTreeMap<String, String>,
    },
    Copy {
        from: MountSource,
        src: String,
        dest: String,
    },
    /// Write a single file
    MkFile {
        path: String,
        mode: u32,
        contents: String,
    },
}

/// One node in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: StageId,
    pub role: StageRole,
    pub name: String,
    pub base: StageBase,
    pub operation: StageOperation,
    pub mounts: Vec<Mount>,
    /// Label for the stage result
    pub output: String,
    /// Directory of the result to hand back to the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
}

impl Stage {
    /// Stages this one reads from, ascending, no repeats
    #[must_use]
    pub fn dependencies(&self) -> Vec<StageId> {
        let mut deps = Vec::new();
        if let StageBase::Stage(id) = self.base {
            deps.push(id);
        }
        if let StageOperation::Copy {
            from: MountSource::Stage(id),
            ..
        } = self.operation
        {
            deps.push(id);
        }
        deps.extend(self.mounts.iter().filter_map(|mount| match mount.from {
            MountSource::Stage(id) => Some(id),
            MountSource::Source(_) => None,
        }));
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Script run by this stage, if it is a run stage
    #[must_use]
    pub fn script(&self) -> Option<&str> {
        match &self.operation {
            StageOperation::Run { script, .. } => Some(script),
            _ => None,
        }
    }
}

/// Ordered, acyclic list of stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    stages: Vec<Stage>,
}

impl BuildPlan {
    pub(crate) fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// First stage with `role`
    #[must_use]
    pub fn stage(&self, role: StageRole) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.role == role)
    }

    /// Stages consumed by stage `id`; empty if `id` is not in the plan
    #[must_use]
    pub fn dependencies(&self, id: StageId) -> Vec<StageId> {
        self.stages
            .get(id.0)
            .map(Stage::dependencies)
            .unwrap_or_default()
    }

    /// The synthesized build script
    #[must_use]
    pub fn build_script(&self) -> Option<&str> {
        self.stage(StageRole::BuildExecution)
            .and_then(Stage::script)
    }

    /// Stage whose result is exported to the caller
    #[must_use]
    pub fn export(&self) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.export.is_some())
    }
}
