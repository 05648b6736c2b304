//! Classification of raw git command lines into typed descriptors.
//!
//! Pure text processing. The only filesystem access is the optional
//! file-vs-branch check done by [`classify_in`] for `checkout`.

pub mod args;
mod classify;
mod kind;
pub mod tokens;

pub use args::CommandArgs;
pub use classify::{classify, classify_in, repository_basename, GitCommand, GIT_PROGRAM};
pub use kind::CommandKind;
