//! pwc-core
//!
//! Core building blocks for counting lines, words and bytes of one file with
//! a supervised worker per partition.
//!
//! # モジュール構成
//! - **domain**: partitions, counts, outcomes, config, errors, ids
//! - **ports**: `Counter` and `Worker` traits
//! - **app**: attempt, result channel, supervisor, aggregator, runner
//! - **impls**: `ByteCounter`, `TaskWorker`, `ProcessWorker`

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
