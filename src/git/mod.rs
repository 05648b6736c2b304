//! Read-only git queries used to enrich recognised commands.

mod client;
mod error;
pub mod parse;
#[cfg(test)]
pub(crate) mod testing;

pub use client::GitClient;
pub use error::GitError;
pub use parse::hosting_repo_url;
