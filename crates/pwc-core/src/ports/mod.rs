//! Ports - 抽象化レイヤー
//!
//! - **Counter**: byte-range counting (external collaborator)
//! - **Worker**: one attempt over one partition

pub mod counter;
pub mod worker;

pub use self::counter::Counter;
pub use self::worker::{Assignment, Worker};
