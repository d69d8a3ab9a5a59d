pub mod client;
pub mod stream;

pub use client::{AnalysisClient, AnalyzeError, check_length, copy_for_ai};
pub use stream::{AnalysisStream, LineAssembler};
