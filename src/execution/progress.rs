//! Progress tracking for script execution.

use crate::core::error::ResourceError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// Execution has started.
    Started { total_steps: usize },
    /// A step is about to load its input.
    StepStarted {
        index: usize,
        total: usize,
        input: PathBuf,
    },
    /// An instruction is about to run.
    InstructionStarted {
        step: usize,
        index: usize,
        total: usize,
        name: &'static str,
    },
    /// An instruction has finished.
    InstructionCompleted {
        step: usize,
        index: usize,
        duration_ms: u64,
    },
    /// A step has written its output.
    StepCompleted {
        index: usize,
        output: PathBuf,
        duration_ms: u64,
    },
    /// A step could not read its input or write its output.
    StepFailed { index: usize, message: String },
    /// Execution has completed.
    Completed {
        total_duration_ms: u64,
        steps_completed: usize,
        steps_failed: usize,
    },
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Counts finished steps and forwards events to an optional callback.
pub struct ProgressTracker {
    total_steps: usize,
    completed_steps: AtomicUsize,
    failed_steps: AtomicUsize,
    start_time: Option<Instant>,
    callback: Option<Arc<ProgressCallback>>,
}

impl ProgressTracker {
    /// Create a tracker for `total_steps` steps.
    pub fn new(total_steps: usize) -> Self {
        Self {
            total_steps,
            completed_steps: AtomicUsize::new(0),
            failed_steps: AtomicUsize::new(0),
            start_time: None,
            callback: None,
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: Arc<ProgressCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            total_steps: self.total_steps,
        });
    }

    pub fn step_started(&self, index: usize, input: PathBuf) {
        self.send_update(ProgressUpdate::StepStarted {
            index,
            total: self.total_steps,
            input,
        });
    }

    pub fn instruction_started(&self, step: usize, index: usize, total: usize, name: &'static str) {
        self.send_update(ProgressUpdate::InstructionStarted {
            step,
            index,
            total,
            name,
        });
    }

    pub fn instruction_completed(&self, step: usize, index: usize, duration_ms: u64) {
        self.send_update(ProgressUpdate::InstructionCompleted {
            step,
            index,
            duration_ms,
        });
    }

    pub fn step_completed(&self, index: usize, output: PathBuf, duration_ms: u64) {
        self.completed_steps.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::StepCompleted {
            index,
            output,
            duration_ms,
        });
    }

    pub fn step_failed(&self, index: usize, error: &ResourceError) {
        self.failed_steps.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::StepFailed {
            index,
            message: error.to_string(),
        });
    }

    /// Complete tracking.
    pub fn complete(&self) {
        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: self.elapsed_ms(),
            steps_completed: self.completed_steps.load(Ordering::Relaxed),
            steps_failed: self.failed_steps.load(Ordering::Relaxed),
        });
    }

    fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}
