//! Tool location and process launch for the rngrig engine.
//!
//! This crate answers three questions for every external test binary:
//! where is it on this host ([`Resolver::resolve`]), does it actually exist
//! there ([`Resolver::validate`]), and how is it started so that the same
//! invocation works natively, through the WSL compatibility layer, or for
//! a containerized form ([`Resolver::command_for`] / [`Resolver::spawn`]).
//!
//! # Security
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style
//! invocation. Arguments cross trust boundaries as discrete elements; no
//! shell string is ever evaluated.

mod command_spec;
mod error;
mod launch;
mod paths;
mod resolve;
mod tool;
mod wsl;

pub mod platform;

pub use command_spec::CommandSpec;
pub use error::ResolverError;
pub use launch::StdinMode;
pub use resolve::{PathKind, ResolvedTool, Resolver};
pub use tool::{ToolId, ToolLocation};
