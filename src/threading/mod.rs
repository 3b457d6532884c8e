/// Thread scheduling for the pipeline stages
pub mod worker_pool;

pub use worker_pool::{Job, TaskState, WorkerPool, WorkerTask};
