mod analyzer;
mod describe;

pub use analyzer::CommandAnalyzer;
pub use describe::{describe, hosting_record};
