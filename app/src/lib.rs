use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{runtime::Handle, select, sync::watch, task::JoinHandle};
use tracing::{debug, info};

pub mod worker;

pub use worker::CycleWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("Nothing to refresh")]
    NothingToDo,
}

/// Run state tagged with the task generation which owns it, so a retired
/// task can never overwrite the state of its successor.
#[derive(Debug, Clone, Copy)]
struct Status {
    state: RunState,
    generation: u64,
}

struct Task {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns at most one background task which repeatedly runs a
/// [`CycleWorker`] and publishes its output.
///
/// All methods are synchronous and never wait for the background task, so
/// they are safe to call from a UI thread.
pub struct RefreshLoop<W: CycleWorker> {
    worker: Arc<W>,
    runtime: Handle,
    input: watch::Receiver<W::Input>,
    period: watch::Sender<Duration>,
    output: Arc<watch::Sender<Option<W::Output>>>,
    status: Arc<watch::Sender<Status>>,
    task: Option<Task>,
}

impl<W: CycleWorker> RefreshLoop<W> {
    pub fn new(
        worker: Arc<W>,
        runtime: Handle,
        input: watch::Receiver<W::Input>,
        period: Duration,
    ) -> Self {
        let (period, _) = watch::channel(period);
        let (output, _) = watch::channel(None);
        let (status, _) = watch::channel(Status {
            state: RunState::Stopped,
            generation: 0,
        });

        Self {
            worker,
            runtime,
            input,
            period,
            output: Arc::new(output),
            status: Arc::new(status),
            task: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.status.borrow().state
    }

    pub fn period(&self) -> Duration {
        *self.period.borrow()
    }

    /// Takes effect at the next sleep between cycles.
    pub fn set_period(&self, period: Duration) {
        self.period.send_replace(period);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<W::Output>> {
        self.output.subscribe()
    }

    /// Stopped → Running. Starting a running loop is a no-op.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.state() == RunState::Running {
            debug!("Refresh loop already running");
            return Ok(());
        }
        if !self.worker.has_work(&self.input.borrow()) {
            return Err(StartError::NothingToDo);
        }
        self.spawn();
        Ok(())
    }

    /// Running → Stopped. Returns immediately; an in-flight cycle is
    /// abandoned and its result never published.
    pub fn stop(&mut self) {
        if let Some(task) = &self.task {
            task.shutdown.send_replace(true);
        }
        let stopped = self.status.send_if_modified(|status| {
            let was_running = status.state == RunState::Running;
            status.state = RunState::Stopped;
            was_running
        });
        if stopped {
            info!("Refresh loop stopped");
        }
    }

    /// Replaces the running task so the next cycle sees fresh input.
    /// Does nothing while stopped.
    pub fn restart(&mut self) {
        if self.state() == RunState::Running {
            info!("Restart refresh loop");
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        // The successor waits for its predecessor, so cycles never overlap.
        let previous = self.task.take().map(|task| {
            task.shutdown.send_replace(true);
            task.handle
        });

        let mut generation = 0;
        self.status.send_modify(|status| {
            status.generation += 1;
            status.state = RunState::Running;
            generation = status.generation;
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = self.runtime.spawn(run(
            self.worker.clone(),
            self.input.clone(),
            self.period.subscribe(),
            self.output.clone(),
            self.status.clone(),
            generation,
            shutdown_rx,
            previous,
        ));
        info!(generation, "Refresh loop started");

        self.task = Some(Task {
            shutdown: shutdown_tx,
            handle,
        });
    }
}

impl<W: CycleWorker> Drop for RefreshLoop<W> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.shutdown.send_replace(true);
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run<W: CycleWorker>(
    worker: Arc<W>,
    input: watch::Receiver<W::Input>,
    period: watch::Receiver<Duration>,
    output: Arc<watch::Sender<Option<W::Output>>>,
    status: Arc<watch::Sender<Status>>,
    generation: u64,
    mut shutdown: watch::Receiver<bool>,
    previous: Option<JoinHandle<()>>,
) {
    if let Some(previous) = previous {
        // A panicked predecessor is already gone; nothing left to wait for.
        let _ = previous.await;
    }

    loop {
        if *shutdown.borrow() {
            break;
        }

        let current = input.borrow().clone();
        if !worker.has_work(&current) {
            info!(generation, "Nothing to refresh - stop");
            break;
        }

        let produced = select! {
            biased;
            _ = shutdown.changed() => break,
            produced = worker.cycle(current) => produced,
        };
        // A stop may land while the finished cycle waits to be polled.
        if *shutdown.borrow() {
            break;
        }
        output.send_replace(Some(produced));

        let wait = *period.borrow();
        debug!(?wait, "Wait for");
        select! {
            _ = tokio::time::sleep(wait) => {},
            _ = shutdown.changed() => break,
        }
    }

    status.send_if_modified(|status| {
        if status.generation == generation && status.state == RunState::Running {
            status.state = RunState::Stopped;
            true
        } else {
            false
        }
    });
    debug!(generation, "Refresh task finished");
}
