//! Impls - ports の実装
//!
//! - **ByteCounter**: default `Counter`
//! - **TaskWorker**: attempt on a blocking tokio task
//! - **ProcessWorker**: attempt in a child process

pub mod byte_counter;
pub mod process_worker;
pub mod task_worker;

pub use self::byte_counter::ByteCounter;
pub use self::process_worker::{ATTEMPT_SUBCOMMAND, EXIT_CRASHED, EXIT_RANGE_ERROR, ProcessWorker};
pub use self::task_worker::TaskWorker;
