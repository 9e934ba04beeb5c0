pub mod alert;
pub mod fetcher;
pub mod pacing;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
