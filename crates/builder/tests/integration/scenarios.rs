//! End-to-end compile scenarios

use super::{compiler, spec_with};
use apkforge_builder::{SourceTree, StageOperation, StageRole};
use apkforge_errors::{Error, NotFoundError, PreconditionError, SchemaError, ValidationError};
use apkforge_types::Spec;

fn apkbuild(spec: &Spec) -> String {
    let plan = compiler().compile(spec, &SourceTree::context()).unwrap();
    match &plan.stage(StageRole::Packaging).unwrap().operation {
        StageOperation::MkFile { contents, .. } => contents.clone(),
        other => panic!("unexpected packaging operation: {other:?}"),
    }
}

#[test]
fn test_inline_step_script() {
    let spec = spec_with("pipeline:\n  - run: echo hi\n");
    let plan = compiler().compile(&spec, &SourceTree::context()).unwrap();
    assert_eq!(plan.build_script(), Some("set -e\nmkdir -p /pkg\necho hi\n"));
}

#[test]
fn test_missing_required_input_is_named() {
    let spec = spec_with("pipeline:\n  - uses: fetch\n");
    let err = compiler()
        .compile(&spec, &SourceTree::context())
        .unwrap_err();
    match err {
        Error::Validation(ValidationError::MissingInput {
            step,
            pipeline,
            input,
        }) => {
            assert_eq!(step, 1);
            assert_eq!(pipeline, "fetch");
            assert_eq!(input, "url");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_release_counter_from_epoch() {
    let unset = spec_with("pipeline:\n  - run: make\n");
    assert!(apkbuild(&unset).contains("pkgrel=\"0\"\n"));

    let bumped = spec_with("epoch: 3\npipeline:\n  - run: make\n");
    assert!(apkbuild(&bumped).contains("pkgrel=\"3\"\n"));
}

#[test]
fn test_missing_description_fails_before_steps() {
    let spec = Spec::from_yaml_str(
        r#"
name: foo
version: "1.0"
url: https://foo.example
license: MIT
pipeline:
  - uses: no/such/pipeline
"#,
    )
    .unwrap();
    let err = compiler()
        .compile(&spec, &SourceTree::context())
        .unwrap_err();
    assert!(matches!(
        &err,
        Error::Precondition(PreconditionError::MissingField { field }) if field == "description"
    ));
}

#[test]
fn test_empty_pipeline_is_rejected() {
    let err = compiler()
        .compile(&spec_with(""), &SourceTree::context())
        .unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::NoBuildSteps)));
}

#[test]
fn test_invalid_step_reported_before_later_unknown_pipeline() {
    let spec = spec_with(
        "pipeline:\n  - run: echo ok\n  - uses: fetch\n    run: echo both\n  - uses: no/such/pipeline\n",
    );
    let err = compiler().synthesize(&spec).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::ConflictingStep { step: 2 })
    ));
}

#[test]
fn test_unknown_pipeline() {
    let spec = spec_with("pipeline:\n  - uses: autoconf/bogus\n");
    let err = compiler().synthesize(&spec).unwrap_err();
    assert!(matches!(
        &err,
        Error::NotFound(NotFoundError::Pipeline { name }) if name == "autoconf/bogus"
    ));
    assert_eq!(err.to_string(), "not found: pipeline \"autoconf/bogus\" not found");
}

#[test]
fn test_unknown_argument_lists_allowed_inputs() {
    let spec = spec_with("pipeline:\n  - uses: autoconf/make\n    with:\n      jobs: 4\n");
    let err = compiler().synthesize(&spec).unwrap_err();
    assert_eq!(
        err.to_string(),
        "validation error: pipeline step 1 (autoconf/make): unknown input \"jobs\" (allowed: dir, opts)"
    );
}

#[test]
fn test_unsigned_argument_keeps_every_digit() {
    let spec =
        spec_with("pipeline:\n  - uses: fetch\n    with:\n      url: 18446744073709551615\n");
    let script = compiler().synthesize(&spec).unwrap();
    assert!(script
        .as_str()
        .contains("wget -q -O \"$archive\" \"18446744073709551615\"\n"));
}

#[test]
fn test_autotools_pipeline_script() {
    let spec = spec_with(
        r#"
environment:
  contents:
    packages:
      - build-base
pipeline:
  - uses: fetch
    with:
      url: https://foo.example/foo-${{package.version}}.tar.gz
      expected-sha256: abc123
  - uses: autoconf/configure
    with:
      opts: --disable-nls
  - uses: autoconf/make
  - uses: autoconf/make-install
  - uses: strip
"#,
    );
    let script = compiler().synthesize(&spec).unwrap();
    let text = script.as_str();

    assert!(text.starts_with("set -e\nmkdir -p /pkg\n"));
    assert!(text.contains("wget -q -O \"$archive\" \"https://foo.example/foo-1.0.tar.gz\"\n"));
    assert!(text.contains("echo \"abc123  $archive\" | sha256sum -c -\n"));
    assert!(text.contains("--strip-components=1\n"));
    assert!(text.contains("\n  --prefix=/usr \\\n"));
    assert!(text.contains("\n   --disable-nls\n"));
    assert!(text.contains("make -C \".\" -j$(nproc) \n"));
    assert!(text.contains("make -C \".\" install DESTDIR=\"/pkg\" \n"));
    assert!(text.contains("find \"/pkg\" -type f"));
    assert!(text.contains("strip --strip-unneeded \"$f\""));
    assert!(!text.contains("${{"));

    assert_eq!(
        script.needs(),
        ["wget", "tar", "autoconf", "automake", "make", "binutils", "file"]
    );
}

#[test]
fn test_compile_is_deterministic() {
    let spec = spec_with(
        "pipeline:\n  - uses: cmake/configure\n    with:\n      build-type: Debug\n  - uses: cmake/build\n  - uses: cmake/install\n",
    );
    let compiler = compiler();
    let first = compiler.compile(&spec, &SourceTree::context()).unwrap();
    let second = compiler.compile(&spec, &SourceTree::context()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert!(first
        .build_script()
        .unwrap()
        .contains("-DCMAKE_BUILD_TYPE=Debug"));
}
