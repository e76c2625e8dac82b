//! Execution module.
//!
//! This module runs parsed scripts: strip dispatch of single filters, the
//! step-by-step runner and progress reporting.

pub mod dispatch;
pub mod engine;
pub mod progress;

pub use dispatch::{dispatch, partition, DispatchConfig, StripPolicy};
pub use engine::{ExecutionOptions, ExecutionReport, ExecutionStats, ScriptRunner};
pub use progress::{ProgressTracker, ProgressUpdate};
