//! Pipeline catalog caching

use apkforge_builder::{PipelineCatalog, PlanCompiler, SourceTree};
use apkforge_config::CompilerConfig;
use apkforge_errors::{Error, SchemaError};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_bundled_names() {
    let catalog = PipelineCatalog::bundled();
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(
        names,
        [
            "autoconf/configure",
            "autoconf/make",
            "autoconf/make-install",
            "cmake/build",
            "cmake/configure",
            "cmake/install",
            "fetch",
            "git-checkout",
            "strip",
        ]
    );
}

#[test]
fn test_every_bundled_pipeline_parses() {
    let catalog = PipelineCatalog::bundled();
    let names: Vec<String> = catalog.names().map(str::to_string).collect();
    for name in &names {
        let def = catalog.resolve(name).unwrap();
        assert!(!def.runs.trim().is_empty(), "{name} has no script");
        assert_eq!(def.id, *name);
    }
    assert_eq!(catalog.loaded_count(), names.len());
}

#[test]
fn test_second_lookup_is_cached() {
    let catalog = PipelineCatalog::bundled();
    let first = catalog.resolve("fetch").unwrap();
    let second = catalog.resolve("fetch").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(catalog.loaded_count(), 1);
}

#[test]
fn test_broken_definition_is_not_cached() {
    let catalog = PipelineCatalog::from_sources([
        ("no-runs", "name: nothing to run\n"),
        ("bad-yaml", "runs: [unterminated\n"),
    ]);

    let err = catalog.resolve("no-runs").unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::MissingRuns { .. })));
    let err = catalog.resolve("bad-yaml").unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::PipelineParse { .. })));
    assert_eq!(catalog.loaded_count(), 0);

    assert!(catalog.resolve("no-runs").is_err());
}

#[test]
fn test_concurrent_first_lookups_share_one_instance() {
    const THREADS: usize = 8;
    let catalog = Arc::new(PipelineCatalog::bundled());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                catalog.resolve("cmake/configure").unwrap()
            })
        })
        .collect();

    let defs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for def in &defs[1..] {
        assert!(Arc::ptr_eq(&defs[0], def));
    }
    assert_eq!(catalog.loaded_count(), 1);
}

#[test]
fn test_compilers_share_a_catalog() {
    let catalog = Arc::new(PipelineCatalog::bundled());
    let a = PlanCompiler::with_catalog(Arc::clone(&catalog), CompilerConfig::default()).unwrap();
    let b = PlanCompiler::with_catalog(Arc::clone(&catalog), CompilerConfig::default()).unwrap();

    let spec = super::spec_with("pipeline:\n  - uses: autoconf/make\n");
    a.compile(&spec, &SourceTree::context()).unwrap();
    b.compile(&spec, &SourceTree::context()).unwrap();

    assert!(Arc::ptr_eq(a.catalog(), b.catalog()));
    assert_eq!(catalog.loaded_count(), 1);
}

#[test]
fn test_custom_catalog_pipeline() {
    let catalog = Arc::new(PipelineCatalog::from_sources([(
        "site/greet",
        "inputs:\n  who:\n    required: true\nruns: echo hello ${{inputs.who}} from ${{package.name}}\n",
    )]));
    let compiler = PlanCompiler::with_catalog(catalog, CompilerConfig::default()).unwrap();
    let spec = super::spec_with("pipeline:\n  - uses: site/greet\n    with:\n      who: world\n");
    let script = compiler.synthesize(&spec).unwrap();
    assert_eq!(
        script.as_str(),
        "set -e\nmkdir -p /pkg\necho hello world from foo\n"
    );
}
