//! Progress poller
//!
//! Polls the validation service for the status of one run, publishes the
//! derived display state, and signals completion exactly once. Each watched
//! run gets its own task behind a [`PollerHandle`]; dropping or stopping the
//! handle ends the task.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};
use valwatch_client::{ClientError, ProgressSource};
use valwatch_core::domain::run::{JobStatus, RunId, RunState};

use crate::config::PollerConfig;
use crate::error::{MonitorError, Result};
use crate::state::{NO_RUN_IN_PROGRESS, PollerState};

/// Invoked once with the payload of the first terminal snapshot
pub type CompletionCallback = Box<dyn FnOnce(JobStatus) + Send + 'static>;

/// Why a poll task stopped on its own
#[derive(Debug, Clone, PartialEq)]
pub enum PollExit {
    /// The service reported COMPLETED, FAILED or ERROR
    Terminal(JobStatus),
    /// The service confirmed the run as CANCELLED
    ServerCancelled(JobStatus),
    /// The retry policy gave up on the service
    ConnectionLost,
}

/// Requests sent from a handle to its poll task
#[derive(Debug)]
enum Command {
    /// The service acknowledged a cancel request
    CancelAcknowledged { applied: oneshot::Sender<()> },
}

/// Starts poll tasks for validation runs
#[derive(Clone)]
pub struct ProgressPoller {
    source: Arc<dyn ProgressSource>,
    config: PollerConfig,
}

impl ProgressPoller {
    /// Creates a new poller over the given status source
    pub fn new(source: Arc<dyn ProgressSource>, config: PollerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Starts watching a run
    ///
    /// Returns `None` without any network activity when `run_id` is blank.
    /// The first poll is issued immediately; later polls follow the
    /// configured interval. `on_complete` runs at most once, with the first
    /// COMPLETED, FAILED or ERROR snapshot.
    pub fn start<F>(&self, run_id: &str, on_complete: F) -> Option<PollerHandle>
    where
        F: FnOnce(JobStatus) + Send + 'static,
    {
        let Some(run_id) = RunId::parse(run_id) else {
            info!("{}", NO_RUN_IN_PROGRESS);
            return None;
        };

        Some(self.spawn(run_id, Box::new(on_complete)))
    }

    fn spawn(&self, run_id: RunId, on_complete: CompletionCallback) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(PollerState::new(run_id.clone(), Instant::now()));
        let (command_tx, command_rx) = mpsc::channel(8);

        let task = PollTask {
            run_id: run_id.clone(),
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            state: state_tx,
            commands: command_rx,
            commands_open: true,
            on_complete: Some(on_complete),
        };

        info!(
            "Watching run {} (interval: {:?})",
            run_id, self.config.poll_interval
        );

        PollerHandle {
            run_id,
            source: Arc::clone(&self.source),
            state: state_rx,
            commands: command_tx,
            task: Some(tokio::spawn(task.run())),
        }
    }
}

/// Owner of one running poll task
///
/// Dropping the handle aborts the task; [`PollerHandle::stop`] additionally
/// waits until it is gone, so no state is published afterwards.
pub struct PollerHandle {
    run_id: RunId,
    source: Arc<dyn ProgressSource>,
    state: watch::Receiver<PollerState>,
    commands: mpsc::Sender<Command>,
    task: Option<JoinHandle<PollExit>>,
}

impl PollerHandle {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Snapshot of the current display state
    pub fn state(&self) -> PollerState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.clone()
    }

    /// Whether the poll task has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Request cancellation of the run
    ///
    /// Only offered once the service reported the run as RUNNING. When the
    /// service acknowledges the request the local state switches to CANCELLED
    /// before this returns, without waiting for the next poll. A failed
    /// request leaves the state untouched; it is logged and returned.
    pub async fn cancel(&self) -> Result<()> {
        let (can_cancel, status) = {
            let state = self.state.borrow();
            (state.can_cancel(), state.status)
        };
        if !can_cancel {
            return Err(MonitorError::NotRunning {
                run_id: self.run_id.clone(),
                status,
            });
        }

        if let Err(e) = self.source.cancel_run(&self.run_id).await {
            warn!("Failed to cancel run {}: {}", self.run_id, e);
            return Err(e.into());
        }

        info!("Cancellation of run {} acknowledged", self.run_id);

        let (applied, done) = oneshot::channel();
        self.commands
            .send(Command::CancelAcknowledged { applied })
            .await
            .map_err(|_| MonitorError::Stopped(self.run_id.clone()))?;
        done.await
            .map_err(|_| MonitorError::Stopped(self.run_id.clone()))
    }

    /// Wait for the poll task to stop on its own
    pub async fn wait(mut self) -> Result<PollExit> {
        let task = self
            .task
            .take()
            .ok_or_else(|| MonitorError::Stopped(self.run_id.clone()))?;
        Ok(task.await?)
    }

    /// Stop polling and wait until the task is gone
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Stopped polling run {}", self.run_id);
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// State owned by a running poll task
struct PollTask {
    run_id: RunId,
    source: Arc<dyn ProgressSource>,
    config: PollerConfig,
    state: watch::Sender<PollerState>,
    commands: mpsc::Receiver<Command>,
    commands_open: bool,
    on_complete: Option<CompletionCallback>,
}

impl PollTask {
    /// The poll loop
    ///
    /// Requests are serialized: the next one is issued only after the
    /// previous one resolved and its tick came due, so a late response can
    /// never overwrite a newer one.
    async fn run(mut self) -> PollExit {
        let mut failures: u32 = 0;
        let mut next_poll = Instant::now();

        loop {
            self.idle_until(next_poll).await;
            let scheduled = next_poll;

            debug!("Polling progress for run {}", self.run_id);

            match self.fetch().await {
                Ok(snapshot) => {
                    failures = 0;
                    let now = Instant::now();
                    let config = &self.config;
                    self.state
                        .send_modify(|state| {
                            state.apply_snapshot(&snapshot, now, config);
                        });

                    if snapshot.status.is_terminal() {
                        info!(
                            "Run {} finished with status {}",
                            self.run_id, snapshot.status
                        );
                        if let Some(on_complete) = self.on_complete.take() {
                            on_complete(snapshot.clone());
                        }
                        return PollExit::Terminal(snapshot);
                    }

                    if snapshot.status == RunState::Cancelled {
                        info!("Run {} cancelled by the service", self.run_id);
                        return PollExit::ServerCancelled(snapshot);
                    }

                    next_poll = next_tick(scheduled, self.config.poll_interval, now);
                }
                Err(e) if e.is_rejected() => {
                    debug!("Skipping update for run {}: {}", self.run_id, e);
                    failures = 0;
                    self.state.send_modify(|state| state.record_rejection());
                    next_poll = next_tick(scheduled, self.config.poll_interval, Instant::now());
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let lost = self.config.retry.is_exhausted(failures);

                    warn!(
                        "Failed to fetch progress for run {} ({} in a row): {}",
                        self.run_id, failures, e
                    );
                    self.state
                        .send_modify(|state| state.record_fetch_failure(failures, lost));

                    if lost {
                        error!(
                            "Lost connection to the validation service after {} failures, stopped watching run {}",
                            failures, self.run_id
                        );
                        return PollExit::ConnectionLost;
                    }

                    let delay = self.config.retry.backoff(self.config.poll_interval, failures);
                    debug!("Retrying run {} in {:?}", self.run_id, delay);
                    next_poll = Instant::now() + delay;
                }
            }
        }
    }

    /// Sleep until `deadline` while serving handle commands
    async fn idle_until(&mut self, deadline: Instant) {
        let sleep = time::sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return,
                command = self.commands.recv(), if self.commands_open => {
                    self.handle_command(command);
                }
            }
        }
    }

    /// Issue one progress request while serving handle commands
    async fn fetch(&mut self) -> std::result::Result<JobStatus, ClientError> {
        let source = Arc::clone(&self.source);
        let run_id = self.run_id.clone();
        let request = source.fetch_progress(&run_id);
        tokio::pin!(request);

        loop {
            tokio::select! {
                result = &mut request => return result,
                command = self.commands.recv(), if self.commands_open => {
                    self.handle_command(command);
                }
            }
        }
    }

    fn handle_command(&mut self, command: Option<Command>) {
        match command {
            Some(Command::CancelAcknowledged { applied }) => {
                let now = Instant::now();
                self.state.send_modify(|state| state.apply_cancel_ack(now));
                let _ = applied.send(());
            }
            None => self.commands_open = false,
        }
    }
}

/// Fixed-rate schedule: one interval after the previous tick, or one
/// interval from now if the request overran it
fn next_tick(scheduled: Instant, interval: Duration, now: Instant) -> Instant {
    let next = scheduled + interval;
    if next > now { next } else { now + interval }
}
