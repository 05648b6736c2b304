pub mod git;
pub mod process;

pub use git::{GitRunner, SystemGitRunner};
pub use process::{hostname, ProcessDataSource, ProcessInfo, SystemProcessDataSource};
