//! Stage wiring of compiled plans

use super::{compiler, spec_with};
use apkforge_builder::{
    MountSource, PlanCompiler, SourceTree, StageBase, StageId, StageOperation, StageRole,
};
use apkforge_config::CompilerConfig;

fn spec() -> apkforge_types::Spec {
    spec_with(
        r"
dependencies:
  runtime:
    - musl
environment:
  contents:
    repositories:
      - https://dl-cdn.alpinelinux.org/alpine/edge/community
    packages:
      - build-base
      - make
pipeline:
  - uses: autoconf/make
  - uses: autoconf/make-install
build:
  install_dir: /opt/foo
  source_dir: foo-1.0
",
    )
}

#[test]
fn test_stage_order_and_roles() {
    let plan = compiler().compile(&spec(), &SourceTree::context()).unwrap();
    let roles: Vec<StageRole> = plan.stages().iter().map(|s| s.role).collect();
    assert_eq!(
        roles,
        [
            StageRole::EnvironmentSetup,
            StageRole::SourceMaterialization,
            StageRole::BuildExecution,
            StageRole::Packaging,
            StageRole::Signing,
        ]
    );
    for (index, stage) in plan.stages().iter().enumerate() {
        assert_eq!(stage.id, StageId(index));
        for dep in stage.dependencies() {
            assert!(dep < stage.id, "stage {} depends on later {dep}", stage.id);
        }
    }
}

#[test]
fn test_stage_dependencies() {
    let plan = compiler().compile(&spec(), &SourceTree::context()).unwrap();
    assert!(plan.dependencies(StageId(0)).is_empty());
    assert_eq!(plan.dependencies(StageId(1)), [StageId(0)]);
    assert_eq!(plan.dependencies(StageId(2)), [StageId(1)]);
    assert!(plan.dependencies(StageId(3)).is_empty());
    assert_eq!(
        plan.dependencies(StageId(4)),
        [StageId(0), StageId(2), StageId(3)]
    );
}

#[test]
fn test_environment_stage() {
    let config = CompilerConfig {
        base_image: "alpine:edge".to_string(),
        ..CompilerConfig::default()
    };
    let plan = PlanCompiler::new(config)
        .unwrap()
        .compile(&spec(), &SourceTree::context())
        .unwrap();
    let stage = plan.stage(StageRole::EnvironmentSetup).unwrap();
    assert_eq!(stage.base, StageBase::Image("alpine:edge".to_string()));
    assert_eq!(stage.output, "environment");
    assert_eq!(
        stage.script(),
        Some(
            "set -e\n\
             echo \"https://dl-cdn.alpinelinux.org/alpine/edge/community\" >> /etc/apk/repositories\n\
             apk add --no-cache build-base make\n"
        )
    );
}

#[test]
fn test_sources_and_build_stages() {
    let plan = compiler()
        .compile(&spec(), &SourceTree::named("checkout"))
        .unwrap();

    let sources = plan.stage(StageRole::SourceMaterialization).unwrap();
    assert_eq!(
        sources.operation,
        StageOperation::Copy {
            from: MountSource::Source("checkout".to_string()),
            src: "/".to_string(),
            dest: "/src".to_string(),
        }
    );

    let build = plan.stage(StageRole::BuildExecution).unwrap();
    match &build.operation {
        StageOperation::Run { workdir, env, .. } => {
            assert_eq!(workdir, "/src/foo-1.0");
            assert_eq!(env.get("PREFIX").map(String::as_str), Some("/opt/foo"));
        }
        other => panic!("unexpected build operation: {other:?}"),
    }
    assert_eq!(build.output, "build");
}

#[test]
fn test_manifest_and_signing_stages() {
    let plan = compiler().compile(&spec(), &SourceTree::context()).unwrap();

    let manifest = plan.stage(StageRole::Packaging).unwrap();
    assert_eq!(manifest.base, StageBase::Scratch);
    match &manifest.operation {
        StageOperation::MkFile {
            path,
            mode,
            contents,
        } => {
            assert_eq!(path, "/APKBUILD");
            assert_eq!(*mode, 0o644);
            assert!(contents.contains("pkgname=\"foo\"\n"));
            assert!(contents.contains("depends=\"musl\"\n"));
        }
        other => panic!("unexpected manifest operation: {other:?}"),
    }

    let signing = plan.stage(StageRole::Signing).unwrap();
    assert_eq!(signing.base, StageBase::Stage(StageId(0)));
    assert_eq!(signing.export.as_deref(), Some("/out"));
    assert_eq!(plan.export().map(|s| s.id), Some(StageId(4)));

    let work = signing.mounts.iter().find(|m| m.target == "/work").unwrap();
    assert_eq!(work.from, MountSource::Stage(StageId(3)));
    assert!(!work.readonly);
    let input = signing.mounts.iter().find(|m| m.target == "/input").unwrap();
    assert_eq!(input.from, MountSource::Stage(StageId(2)));
    assert!(input.readonly);

    let script = signing.script().unwrap();
    assert!(script.contains("adduser -D builder\naddgroup builder abuild\n"));
    assert!(script.contains("abuild-keygen -an"));
    assert!(script.contains("abuild -r"));
}

#[test]
fn test_plan_serializes_to_json() {
    let plan = compiler().compile(&spec(), &SourceTree::context()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    let stages = json["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 5);
    assert_eq!(stages[0]["role"], "environment_setup");
    assert_eq!(stages[2]["operation"]["kind"], "run");
    assert_eq!(stages[3]["base"], "scratch");
    assert_eq!(stages[4]["export"], "/out");
    assert!(stages[0].get("export").is_none());
}
