//! Plain-text plan rendering

use apkforge_builder::{BuildPlan, MountSource, Stage, StageBase, StageOperation};
use std::fmt::Write as _;

pub fn render_plan(plan: &BuildPlan) -> String {
    let mut out = String::new();
    for stage in plan.stages() {
        render_stage(&mut out, stage);
    }
    out
}

fn render_stage(out: &mut String, stage: &Stage) {
    let _ = writeln!(
        out,
        "{} {} [{}] -> {}",
        stage.id, stage.name, stage.role, stage.output
    );
    let base = match &stage.base {
        StageBase::Image(image) => image.clone(),
        StageBase::Scratch => "scratch".to_string(),
        StageBase::Stage(id) => id.to_string(),
    };
    let _ = writeln!(out, "  from {base}");
    for mount in &stage.mounts {
        let mode = if mount.readonly { "ro" } else { "rw" };
        let _ = writeln!(out, "  mount {} <- {} ({mode})", mount.target, source(&mount.from));
    }

    match &stage.operation {
        StageOperation::Run {
            script,
            workdir,
            env,
        } => {
            let _ = writeln!(out, "  run in {workdir}");
            for (key, value) in env {
                let _ = writeln!(out, "  env {key}={value}");
            }
            for line in script.lines() {
                let _ = writeln!(out, "    | {line}");
            }
        }
        StageOperation::Copy { from, src, dest } => {
            let _ = writeln!(out, "  copy {}:{src} -> {dest}", source(from));
        }
        StageOperation::MkFile {
            path,
            mode,
            contents,
        } => {
            let _ = writeln!(out, "  write {path} ({mode:o}, {} bytes)", contents.len());
        }
    }

    if let Some(export) = &stage.export {
        let _ = writeln!(out, "  export {export}");
    }
}

fn source(from: &MountSource) -> String {
    match from {
        MountSource::Stage(id) => id.to_string(),
        MountSource::Source(name) => format!("source:{name}"),
    }
}
