#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for apkforge
//!
//! This crate provides the spec model every other crate consumes: package
//! metadata, build environment, sources and the ordered pipeline steps.

pub mod spec;
pub mod value;

pub use spec::{
    Build, Copyright, Dependencies, Environment, EnvironmentContents, PipelineStep, Source,
    SourceContext, Spec, StepKind, DEFAULT_INSTALL_DIR,
};
pub use value::ArgValue;
