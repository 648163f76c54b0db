//! Transfer engine for prom2influx
//!
//! Fans a migration out across metric names under a concurrency cap, walks
//! each metric's range in fixed windows, converts query results into write
//! batches and commits them with bounded retry.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

mod converter;
mod error;
mod job;
mod orchestrator;
mod report;
#[cfg(test)]
mod test_support;
mod writer;

pub use converter::convert;
pub use error::TransferError;
pub use job::{JobOutcome, MetricJob, run_one};
pub use orchestrator::Migration;
pub use report::{JobReport, JobStatus, MigrationReport};
pub use writer::write_with_retry;
