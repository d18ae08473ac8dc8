use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::error::ParserError;

/// Status of a step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step has been created but not executed yet.
    Starting,
    /// The step completed without error.
    Success,
    /// The step stopped on an error.
    Error,
}

/// Tells the step whether a tasklet wants to be called again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    /// The tasklet can continue to execute.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// Outcome and counters of one step run.
///
/// Errors raised by the tasklet are not propagated to the caller: they are
/// logged, converted into human-readable messages and accumulated in
/// [`StepExecution::errors`], and the status switches to [`StepStatus::Error`].
#[derive(Debug)]
pub struct StepExecution {
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    pub duration: Duration,
    /// Number of records read
    pub read_count: usize,
    /// Number of records written
    pub write_count: usize,
    /// Messages of every failure caught during the run
    pub errors: Vec<String>,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: Instant::now(),
            end_time: None,
            duration: Duration::default(),
            read_count: 0,
            write_count: 0,
            errors: Vec::new(),
        }
    }

    /// `true` when the step ran to completion without any caught failure.
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success && self.errors.is_empty()
    }
}

/// A unit of work run inside a [`TaskletStep`].
pub trait Tasklet {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<RepeatStatus, ParserError>;
}

/// A step that repeatedly calls a tasklet until it reports [`RepeatStatus::Finished`]
/// or fails.
pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl TaskletStep<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Runs the tasklet and returns the execution record.
    ///
    /// Never fails: the first error stops the loop and is recorded in the
    /// returned [`StepExecution`].
    pub fn execute(&self) -> StepExecution {
        let mut step_execution = StepExecution::new(&self.name);
        step_execution.start_time = Instant::now();

        debug!("Start of step: {}", self.name);

        loop {
            match self.tasklet.execute(&mut step_execution) {
                Ok(RepeatStatus::Continuable) => continue,
                Ok(RepeatStatus::Finished) => {
                    step_execution.status = StepStatus::Success;
                    break;
                }
                Err(err) => {
                    error!("Step {} failed: {}", self.name, err);
                    step_execution.errors.push(err.to_string());
                    step_execution.status = StepStatus::Error;
                    break;
                }
            }
        }

        let end_time = Instant::now();
        step_execution.end_time = Some(end_time);
        step_execution.duration = end_time.duration_since(step_execution.start_time);

        info!(
            "End of step {}: {:?}, read: {}, written: {}",
            self.name, step_execution.status, step_execution.read_count, step_execution.write_count
        );

        step_execution
    }
}

pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn tasklet<'a>(self, tasklet: &'a dyn Tasklet) -> TaskletBuilder<'a> {
        TaskletBuilder {
            name: self.name,
            tasklet,
        }
    }
}

pub struct TaskletBuilder<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl<'a> TaskletBuilder<'a> {
    pub fn build(self) -> TaskletStep<'a> {
        TaskletStep {
            name: self.name,
            tasklet: self.tasklet,
        }
    }
}
