mod batch;
mod storage;

pub use batch::{parse_batch, run_batch, BatchItem, BatchOutcome, BatchReport};
pub use storage::save_report;
