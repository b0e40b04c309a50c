//! Compile phase, then watch phase
//!
//! Batches run strictly one after another; the projects of a batch are all
//! dispatched at once and the batch ends when every one of them has
//! finished. The first failing project ends the whole run. Watchers are
//! started only after every batch succeeded.

use std::future::Future;
use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info};

use crate::error::{TspwError, TspwResult};
use crate::options::{CompilationBatch, Options, ProjectPath};
use crate::ui::Reporter;

/// Something that can compile and watch single projects.
pub trait ProjectRunner: Send + Sync + 'static {
    /// Compile one project, resolving when it has finished.
    fn compile(&self, project: &ProjectPath) -> impl Future<Output = TspwResult<()>> + Send;

    /// Start watching one project without waiting for it.
    ///
    /// The handle, if any, resolves once the watcher has gone away.
    fn watch(&self, project: &ProjectPath) -> Option<JoinHandle<()>>;
}

/// Watchers left running after the main flow is over
#[derive(Debug, Default)]
pub struct Watchers {
    handles: Vec<JoinHandle<()>>,
}

impl Watchers {
    /// Wait until every watcher has exited.
    pub async fn wait(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                debug!(error = %e, "watcher task ended abnormally");
            }
        }
    }
}

/// How a successful run ended
#[derive(Debug)]
pub enum RunState {
    /// Nothing is left running
    Done,
    /// Watchers are active and outlive the orchestration
    Watching(Watchers),
}

pub struct Orchestrator<R> {
    runner: Arc<R>,
    reporter: Reporter,
}

impl<R: ProjectRunner> Orchestrator<R> {
    pub fn new(runner: R, reporter: Reporter) -> Self {
        Self {
            runner: Arc::new(runner),
            reporter,
        }
    }

    /// Run every compilation batch, then start every watcher.
    ///
    /// Returns the first compile failure; in that case no later batch runs
    /// and no watcher is started.
    pub async fn run(&self, options: &Options) -> TspwResult<RunState> {
        self.compile_phase(&options.compilation_batches).await?;
        Ok(self.watch_phase(&options.watch_projects))
    }

    async fn compile_phase(&self, batches: &[CompilationBatch]) -> TspwResult<()> {
        let total = batches.len();
        for (index, batch) in batches.iter().enumerate() {
            self.reporter.batch(index, total, batch);
            self.run_batch(batch).await?;
            info!(batch = index + 1, source = %batch.source, "batch compiled");
        }
        Ok(())
    }

    async fn run_batch(&self, batch: &CompilationBatch) -> TspwResult<()> {
        let mut tasks = JoinSet::new();
        for project in &batch.projects {
            let runner = Arc::clone(&self.runner);
            let project = project.clone();
            tasks.spawn(async move { runner.compile(&project).await });
        }

        // Dropping the set on an early return stops awaiting the rest.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(TspwError::Io(std::io::Error::other(e))),
            }
        }
        Ok(())
    }

    fn watch_phase(&self, projects: &[ProjectPath]) -> RunState {
        let handles: Vec<_> = projects
            .iter()
            .filter_map(|project| self.runner.watch(project))
            .collect();
        if handles.is_empty() {
            RunState::Done
        } else {
            info!(count = handles.len(), "watchers running");
            RunState::Watching(Watchers { handles })
        }
    }
}
