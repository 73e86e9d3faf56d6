pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, simulate_range};
pub use pool::WorkerPool;
