pub mod analysis;
pub mod commit;
pub mod record;

pub use analysis::{
    AddAnalysis, Analysis, CheckoutAnalysis, CommitAnalysis, MergeAnalysis, PullAnalysis,
    PushAnalysis, RemoteAnalysis,
};
pub use commit::{ChangeType, CommitDetail, CommitStats, FileChange, UnpushedCommit};
pub use record::ActivityRecord;
