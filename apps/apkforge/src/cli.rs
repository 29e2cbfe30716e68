//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "apkforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile apk package specs into container build plans", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a spec into a build plan
    Compile {
        /// Path to the package spec (YAML)
        spec: PathBuf,

        /// Name of the source tree the executor provides
        #[arg(long, value_name = "NAME")]
        context: Option<String>,

        /// Use this config file instead of the default location
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print only the synthesized build script
    Script {
        /// Path to the package spec (YAML)
        spec: PathBuf,
    },

    /// List bundled pipelines
    Pipelines,
}
