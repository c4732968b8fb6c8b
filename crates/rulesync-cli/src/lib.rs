//! rulesync CLI - command line front end for the Redis rule source helpers

pub mod commands;
pub mod startup;

pub use commands::{Cli, Command, run};
