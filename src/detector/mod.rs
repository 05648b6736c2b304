//! Recognising git invocations in the process table.

pub mod candidate;
pub mod seen;

pub use candidate::{GitProcessDetector, ProcessCandidate};
pub use seen::{SeenPidCache, Sweep};

use thiserror::Error;

/// Why a process that looked like git could not be turned into a candidate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The OS returned no argv (zombie, or the process already exited)
    #[error("process {pid} has no readable command line")]
    MissingCommandLine { pid: u32 },

    /// The working directory could not be read (permission denied or process gone)
    #[error("working directory of process {pid} is not accessible")]
    InaccessibleCwd { pid: u32 },
}
