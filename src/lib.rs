//! Watch the process table for git invocations and keep an activity log of
//! what each one did.

pub mod analysis;
pub mod command;
pub mod config;
pub mod daemon;
pub mod datasource;
pub mod detector;
pub mod git;
pub mod logging;
pub mod models;
pub mod recorder;
