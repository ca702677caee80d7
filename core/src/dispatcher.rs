//! # Dispatcher
//!
//! Fans a list of constructed commands out to one blocking worker each and
//! gathers the results **in submission order**, whatever order the workers
//! finish in. Dry-run commands never reach the [`CommandRunner`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use barnum_common::circus::target::Target;
use barnum_common::dispatch::{CommandLine, CommandRunner, DispatchResult};
use barnum_common::errors::DispatchError;
use tracing::{debug, error};

/// Called with the number of finished workers each time one completes.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub target: Target,
    pub command: CommandLine,
}

impl DispatchJob {
    pub fn new(target: Target, command: CommandLine) -> Self {
        Self { target, command }
    }
}

pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    sequential: bool,
    on_progress: Option<ProgressCallback>,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            sequential: false,
            on_progress: None,
        }
    }

    /// Run jobs one after another instead of concurrently.
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Executes every job and returns one result per job, in job order.
    pub async fn dispatch(&self, jobs: Vec<DispatchJob>) -> Vec<DispatchResult> {
        let completed = Arc::new(AtomicUsize::new(0));

        if self.sequential {
            return jobs
                .into_iter()
                .map(|job| execute(self.runner.as_ref(), job, &completed, self.on_progress.as_ref()))
                .collect();
        }

        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            let target = job.target.clone();
            let command = job.command.clone();
            let runner = Arc::clone(&self.runner);
            let completed = Arc::clone(&completed);
            let on_progress = self.on_progress.clone();

            let handle = tokio::task::spawn_blocking(move || {
                execute(runner.as_ref(), job, &completed, on_progress.as_ref())
            });
            handles.push((target, command, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (target, command, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    error!("{target}: dispatch worker failed: {join_err}");
                    DispatchResult::from_exec(
                        target,
                        &command,
                        Err(DispatchError::TransportFailure {
                            reason: format!("worker failed: {join_err}"),
                        }),
                    )
                }
            };
            results.push(result);
        }
        results
    }
}

fn execute(
    runner: &dyn CommandRunner,
    job: DispatchJob,
    completed: &AtomicUsize,
    on_progress: Option<&ProgressCallback>,
) -> DispatchResult {
    let DispatchJob { target, command } = job;

    let result = if command.dry_run {
        DispatchResult::dry_run(target, &command)
    } else {
        debug!("{target}: executing $ {command}");
        let exec = runner.run(&command);
        DispatchResult::from_exec(target, &command, exec)
    };

    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
    if let Some(callback) = on_progress {
        callback(done);
    }
    result
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
