//! App - アプリケーション層
//!
//! ports を組み合わせて実行の流れを作る。
//!
//! # 主要コンポーネント
//! - **attempt**: one worker attempt with crash injection
//! - **channel**: one-shot Result Channel per partition
//! - **PartitionSupervisor**: retry-until-success loop
//! - **aggregate**: barrier over all channels
//! - **Runner**: wiring for a whole run

pub mod aggregator;
pub mod attempt;
pub mod channel;
pub mod runner;
pub mod supervisor;

pub use self::aggregator::aggregate;
pub use self::attempt::run_attempt;
pub use self::channel::{ResultReceiver, ResultSender, result_channel};
pub use self::runner::{RunReport, Runner, probe_file_size};
pub use self::supervisor::{PartitionSupervisor, RECENT_ATTEMPTS, SupervisorReport};
