//! Tick-driven supervision of external processes.
//!
//! Renders, exports, and similar long-running jobs run out of process via the
//! host's [`Runner`] capability. The supervisor is a queue progressed by an
//! external timer: each tick starts the next task when idle and polls the
//! running one. Cancelling kills the running process and clears the queue.
//! Per-task temp directories are removed whatever the outcome.

use snapvault_host::{ProcessHandle, ProcessStatus, Runner};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{EngineError, Result};

/// One external job.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Short name; also keys the log file names.
    pub name: String,
    pub cmd: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Scratch directory removed when the task finishes, fails, or is
    /// cancelled.
    pub temp_dir: Option<PathBuf>,
}

/// What a tick observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    Started(String),
    Finished { name: String, code: i32 },
    Failed { name: String, reason: String },
    /// Queue cleared; the payload counts dropped tasks (including a killed
    /// running one).
    Cancelled(usize),
}

struct RunningTask {
    spec: TaskSpec,
    handle: Box<dyn ProcessHandle>,
}

/// Queue of external tasks progressed by [`Supervisor::tick`].
pub struct Supervisor {
    runner: Box<dyn Runner>,
    log_dir: PathBuf,
    queue: VecDeque<TaskSpec>,
    current: Option<RunningTask>,
}

impl Supervisor {
    /// `log_dir` receives `<name>.out.log` / `<name>.err.log` per task.
    pub fn new(runner: Box<dyn Runner>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            log_dir: log_dir.into(),
            queue: VecDeque::new(),
            current: None,
        }
    }

    pub fn enqueue(&mut self, spec: TaskSpec) {
        self.queue.push_back(spec);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some() || !self.queue.is_empty()
    }

    /// Name of the task currently running.
    pub fn running(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.spec.name.as_str())
    }

    /// Start work if idle, poll the running task, emit what happened.
    pub fn tick(&mut self) -> Result<Vec<SupervisorEvent>> {
        let mut events = Vec::new();

        if self.current.is_none()
            && let Some(spec) = self.queue.pop_front()
        {
            fs::create_dir_all(&self.log_dir)
                .map_err(|e| EngineError::io("supervisor", &self.log_dir, e))?;
            let stdout = self.log_dir.join(format!("{}.out.log", spec.name));
            let stderr = self.log_dir.join(format!("{}.err.log", spec.name));
            match self.runner.run(&spec.cmd, &spec.env, &stdout, &stderr) {
                Ok(handle) => {
                    info!("started task {}", spec.name);
                    events.push(SupervisorEvent::Started(spec.name.clone()));
                    self.current = Some(RunningTask { spec, handle });
                }
                Err(e) => {
                    cleanup_task(&spec);
                    events.push(SupervisorEvent::Failed {
                        name: spec.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let status = self.current.as_mut().map(|task| task.handle.poll());
        match status {
            None | Some(ProcessStatus::Running) => {}
            Some(ProcessStatus::Exited(code)) => {
                if let Some(task) = self.current.take() {
                    cleanup_task(&task.spec);
                    events.push(SupervisorEvent::Finished {
                        name: task.spec.name,
                        code,
                    });
                }
            }
            Some(ProcessStatus::Failed(reason)) => {
                if let Some(task) = self.current.take() {
                    cleanup_task(&task.spec);
                    events.push(SupervisorEvent::Failed {
                        name: task.spec.name,
                        reason,
                    });
                }
            }
        }

        Ok(events)
    }

    /// Kill the running task and drop everything queued.
    pub fn cancel(&mut self) -> SupervisorEvent {
        let mut dropped = self.queue.len();
        for spec in self.queue.drain(..) {
            cleanup_task(&spec);
        }
        if let Some(mut task) = self.current.take() {
            if let Err(e) = task.handle.kill() {
                warn!("could not kill task {}: {}", task.spec.name, e);
            }
            cleanup_task(&task.spec);
            dropped += 1;
        }
        SupervisorEvent::Cancelled(dropped)
    }
}

fn cleanup_task(spec: &TaskSpec) {
    if let Some(dir) = &spec.temp_dir
        && dir.exists()
        && let Err(e) = fs::remove_dir_all(dir)
    {
        warn!("could not remove task temp dir {}: {}", dir.display(), e);
    }
}
