mod catalog;
mod plan_wiring;
mod scenarios;

use apkforge_builder::PlanCompiler;
use apkforge_config::CompilerConfig;
use apkforge_types::Spec;

pub(crate) const HEADER: &str = r#"
name: foo
version: "1.0"
description: Foo tool
url: https://foo.example
license: MIT
"#;

/// Parse `HEADER` followed by `rest`
pub(crate) fn spec_with(rest: &str) -> Spec {
    Spec::from_yaml_str(&format!("{HEADER}{rest}")).unwrap()
}

pub(crate) fn compiler() -> PlanCompiler {
    PlanCompiler::new(CompilerConfig::default()).unwrap()
}
