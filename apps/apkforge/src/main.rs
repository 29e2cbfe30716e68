#![deny(clippy::pedantic, unsafe_code)]
//! apkforge - compile apk package specs into build plans

mod cli;
mod display;
mod error;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use apkforge_builder::{PipelineCatalog, PlanCompiler, SourceTree};
use apkforge_config::Config;
use apkforge_errors::Error;
use apkforge_types::Spec;
use clap::Parser;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e.0, "apkforge failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Compile {
            spec,
            context,
            config,
            json,
        } => compile(&spec, context, config.as_deref(), json).await?,
        Commands::Script { spec } => script(&spec).await?,
        Commands::Pipelines => {
            for name in PipelineCatalog::bundled().names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}

async fn compile(
    spec_path: &Path,
    context: Option<String>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), Error> {
    let mut config = Config::load_or_default(config_path).await?;
    config.merge_env()?;

    let spec = load_spec(spec_path).await?;
    let source = context.map_or_else(|| SourceTree::for_spec(&spec), SourceTree::named);

    let compiler = PlanCompiler::new(config.compiler)?;
    let plan = compiler.compile(&spec, &source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", display::render_plan(&plan));
    }
    Ok(())
}

async fn script(spec_path: &Path) -> Result<(), Error> {
    let spec = load_spec(spec_path).await?;
    let compiler = PlanCompiler::new(Config::default().compiler)?;
    print!("{}", compiler.synthesize(&spec)?.as_str());
    Ok(())
}

async fn load_spec(path: &Path) -> Result<Spec, Error> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "read spec");
    Spec::from_yaml_bytes(&data)
}
