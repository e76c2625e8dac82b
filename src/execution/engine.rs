//! Script runner.
//!
//! Steps run strictly in declaration order, so a step may read a file
//! written by an earlier one. Within a step every instruction is
//! dispatched in order and each one sees the image produced by the
//! previous instruction.

use crate::core::codec::{ImageCodec, StandardCodec};
use crate::core::error::{KodamaError, ResourceError};
use crate::execution::dispatch::{dispatch, DispatchConfig, StripPolicy};
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use crate::script::{Script, Step};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Execution options.
#[derive(Clone)]
pub struct ExecutionOptions {
    /// How scalable filters are split across workers.
    pub dispatch: DispatchConfig,
    /// Whether to stop on the first failed step.
    pub stop_on_error: bool,
    /// Progress callback.
    pub progress_callback: Option<Arc<ProgressCallback>>,
}

impl std::fmt::Debug for ExecutionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionOptions")
            .field("dispatch", &self.dispatch)
            .field("stop_on_error", &self.stop_on_error)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            stop_on_error: true,
            progress_callback: None,
        }
    }
}

impl ExecutionOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dispatch configuration.
    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the number of workers for scalable filters.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.dispatch.workers = workers;
        self
    }

    /// Set the strip policy.
    pub fn with_strip_policy(mut self, policy: StripPolicy) -> Self {
        self.dispatch.strip_policy = policy;
        self
    }

    /// Enable/disable stop on error.
    pub fn with_stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }
}

/// Result of running a script.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Execution statistics.
    pub stats: ExecutionStats,
    /// Failed steps by 1-based index (only when `stop_on_error` is false).
    pub errors: Vec<(usize, ResourceError)>,
}

impl ExecutionReport {
    /// Whether every step completed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Execution statistics.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    /// Total execution time.
    pub total_duration: Duration,
    /// Number of steps whose output was written.
    pub steps_executed: usize,
    /// Number of steps that failed.
    pub steps_failed: usize,
    /// Number of instructions applied.
    pub instructions_executed: usize,
}

/// Runs parsed scripts against the filesystem.
pub struct ScriptRunner {
    codec: Arc<dyn ImageCodec>,
    default_options: ExecutionOptions,
}

impl ScriptRunner {
    /// Create a runner using the standard codec.
    pub fn new() -> Self {
        Self::with_codec(Arc::new(StandardCodec::new()))
    }

    /// Create a runner reading and writing images through `codec`.
    pub fn with_codec(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            default_options: ExecutionOptions::default(),
        }
    }

    /// Set default options.
    pub fn with_default_options(mut self, options: ExecutionOptions) -> Self {
        self.default_options = options;
        self
    }

    /// The codec used for step inputs and outputs.
    pub fn codec(&self) -> &dyn ImageCodec {
        self.codec.as_ref()
    }

    /// Run every step of `script`.
    ///
    /// With `stop_on_error` the first failing step aborts the run and its
    /// error is returned; later steps are not attempted. Otherwise failures
    /// are collected in the report and the remaining steps still run.
    pub fn run(
        &self,
        script: &Script,
        options: Option<ExecutionOptions>,
    ) -> Result<ExecutionReport, KodamaError> {
        let options = options.unwrap_or_else(|| self.default_options.clone());
        let start_time = Instant::now();

        let mut tracker = ProgressTracker::new(script.len());
        if let Some(callback) = &options.progress_callback {
            tracker = tracker.with_callback(Arc::clone(callback));
        }
        tracker.start();

        let mut report = ExecutionReport::default();

        for step in script.steps() {
            match self.run_step(step, script.len(), &options, &tracker) {
                Ok(instructions) => {
                    report.stats.steps_executed += 1;
                    report.stats.instructions_executed += instructions;
                }
                Err(e) => {
                    error!("step {} failed: {}", step.index(), e);
                    tracker.step_failed(step.index(), &e);
                    report.stats.steps_failed += 1;
                    if options.stop_on_error {
                        tracker.complete();
                        return Err(KodamaError::Resource(e));
                    }
                    report.errors.push((step.index(), e));
                }
            }
        }

        report.stats.total_duration = start_time.elapsed();
        tracker.complete();
        Ok(report)
    }

    /// Run one step and return the number of instructions applied.
    fn run_step(
        &self,
        step: &Step,
        total_steps: usize,
        options: &ExecutionOptions,
        tracker: &ProgressTracker,
    ) -> Result<usize, ResourceError> {
        let step_start = Instant::now();
        tracker.step_started(step.index(), step.input().to_path_buf());
        info!(
            "step {}/{}: {} -> {}",
            step.index(),
            total_steps,
            step.input().display(),
            step.output().display()
        );

        let mut image = self.codec.load(step.input())?;
        debug!("loaded {} ({:?})", step.input().display(), image.bounds());

        let total = step.instructions().len();
        for instruction in step.instructions() {
            let filter = instruction.filter();
            tracker.instruction_started(step.index(), instruction.index(), total, filter.name());
            debug!(
                "instruction {}/{} on line {}: {}",
                instruction.index(),
                total,
                instruction.line(),
                instruction.text()
            );

            let exec_start = Instant::now();
            image = dispatch(&image, filter, &options.dispatch);
            tracker.instruction_completed(
                step.index(),
                instruction.index(),
                exec_start.elapsed().as_millis() as u64,
            );
        }

        self.codec.store(&image, step.output())?;
        info!(
            "step {}/{} done in {:?}",
            step.index(),
            total_steps,
            step_start.elapsed()
        );
        tracker.step_completed(
            step.index(),
            step.output().to_path_buf(),
            step_start.elapsed().as_millis() as u64,
        );
        Ok(total)
    }
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}
