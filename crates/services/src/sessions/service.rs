use std::time::Duration;

use serene_core::cycle::{CycleEvent, DEFAULT_TICK, PhaseCycleController, RunOutcome, RunSnapshot};
use serene_core::model::{CompletedSession, Phase, SessionId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::plan::SessionPlan;
use crate::error::SessionError;
use crate::feedback::FeedbackDispatcher;
use crate::history_service::HistoryService;

/// Discrete notifications streamed while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    PhaseEntered {
        phase: Phase,
        cycle_index: u32,
        phase_duration: Duration,
    },
    CycleCompleted {
        cycles_completed: u32,
        total_cycles: u32,
    },
    Paused,
    Resumed,
}

/// How a session task finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// All cycles ran and the record was persisted.
    Completed(CompletedSession, SessionId),
    /// Stopped before completion; nothing was persisted.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Pause,
    Resume,
    Stop,
}

/// Cloneable remote for pause/resume/stop, usable from other tasks.
#[derive(Debug, Clone)]
pub struct SessionControls {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionControls {
    /// Returns `false` when the session has already ended.
    pub fn pause(&self) -> bool {
        self.commands.send(Command::Pause).is_ok()
    }

    /// Returns `false` when the session has already ended.
    pub fn resume(&self) -> bool {
        self.commands.send(Command::Resume).is_ok()
    }

    /// Cancel the session without recording it. Returns `false` when it has already ended.
    pub fn stop(&self) -> bool {
        self.commands.send(Command::Stop).is_ok()
    }
}

/// Owner handle for a running session.
///
/// Dropping the handle (and every `SessionControls` clone) stops the session.
pub struct SessionHandle {
    controls: SessionControls,
    updates: Option<mpsc::UnboundedReceiver<SessionUpdate>>,
    status: watch::Receiver<Option<RunSnapshot>>,
    task: JoinHandle<Result<SessionEnd, SessionError>>,
}

impl SessionHandle {
    #[must_use]
    pub fn controls(&self) -> SessionControls {
        self.controls.clone()
    }

    pub fn pause(&self) -> bool {
        self.controls.pause()
    }

    pub fn resume(&self) -> bool {
        self.controls.resume()
    }

    pub fn stop(&self) -> bool {
        self.controls.stop()
    }

    /// Take the update stream. Returns `None` after the first call.
    pub fn take_updates(&mut self) -> Option<mpsc::UnboundedReceiver<SessionUpdate>> {
        self.updates.take()
    }

    /// Latest snapshot of the run, `None` once it has ended.
    #[must_use]
    pub fn status(&self) -> Option<RunSnapshot> {
        *self.status.borrow()
    }

    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<Option<RunSnapshot>> {
        self.status.clone()
    }

    /// Wait for the session task to finish.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if recording the completed session failed or the task panicked.
    pub async fn join(self) -> Result<SessionEnd, SessionError> {
        self.task
            .await
            .map_err(|err| SessionError::Task(err.to_string()))?
    }
}

/// Runs breathing sessions on a monotonic tokio ticker.
#[derive(Clone)]
pub struct BreathingSessionService {
    history: HistoryService,
    feedback: FeedbackDispatcher,
    tick: Duration,
}

impl BreathingSessionService {
    #[must_use]
    pub fn new(history: HistoryService, feedback: FeedbackDispatcher) -> Self {
        Self {
            history,
            feedback,
            tick: DEFAULT_TICK,
        }
    }

    /// Override the tick period. Zero is ignored.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        if !tick.is_zero() {
            self.tick = tick;
        }
        self
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Spawn the session task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(&self, plan: SessionPlan) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(None);

        let runner = SessionRunner {
            plan,
            history: self.history.clone(),
            feedback: self.feedback.clone(),
            tick: self.tick,
            controller: PhaseCycleController::new(),
            updates: update_tx,
            status: status_tx,
        };
        let task = tokio::spawn(runner.run(command_rx));

        SessionHandle {
            controls: SessionControls {
                commands: command_tx,
            },
            updates: Some(update_rx),
            status: status_rx,
            task,
        }
    }
}

struct SessionRunner {
    plan: SessionPlan,
    history: HistoryService,
    feedback: FeedbackDispatcher,
    tick: Duration,
    controller: PhaseCycleController,
    updates: mpsc::UnboundedSender<SessionUpdate>,
    status: watch::Sender<Option<RunSnapshot>>,
}

impl SessionRunner {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) -> Result<SessionEnd, SessionError> {
        let pattern = self.plan.pattern;
        tracing::info!(
            technique = %self.plan.technique_name,
            notation = %pattern.notation(),
            cycles = pattern.total_cycles(),
            "session started"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        let events = self.controller.start(pattern);
        if let Some(outcome) = self.handle_events(events) {
            return self.finish(outcome).await;
        }
        self.publish_status();

        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Pause) => {
                        if !self.controller.is_paused() && self.controller.pause() {
                            tracing::debug!("session paused");
                            self.send(SessionUpdate::Paused);
                            self.publish_status();
                        }
                    }
                    Some(Command::Resume) => {
                        if self.controller.is_paused() && self.controller.resume() {
                            ticker.reset();
                            tracing::debug!("session resumed");
                            self.send(SessionUpdate::Resumed);
                            self.publish_status();
                        }
                    }
                    Some(Command::Stop) | None => {
                        let snapshot = self.controller.snapshot();
                        self.controller.stop();
                        self.status.send_replace(None);
                        tracing::info!(
                            elapsed = ?snapshot.map(|s| s.elapsed),
                            "session stopped without recording"
                        );
                        return Ok(SessionEnd::Stopped);
                    }
                },
                _ = ticker.tick() => {
                    if self.controller.is_paused() {
                        continue;
                    }
                    let events = self.controller.tick(self.tick);
                    if let Some(outcome) = self.handle_events(events) {
                        return self.finish(outcome).await;
                    }
                    self.publish_status();
                }
            }
        }
    }

    /// Forward events to feedback and listeners; returns the outcome if the run completed.
    fn handle_events(&self, events: Vec<CycleEvent>) -> Option<RunOutcome> {
        let mut completed = None;
        for event in events {
            match event {
                CycleEvent::PhaseEntered { phase, cycle_index } => {
                    self.feedback.on_phase_enter(phase);
                    self.send(SessionUpdate::PhaseEntered {
                        phase,
                        cycle_index,
                        phase_duration: self.plan.pattern.duration_of(phase),
                    });
                }
                CycleEvent::CycleCompleted { cycles_completed } => {
                    tracing::debug!(cycles_completed, "cycle completed");
                    self.send(SessionUpdate::CycleCompleted {
                        cycles_completed,
                        total_cycles: self.plan.pattern.total_cycles(),
                    });
                }
                CycleEvent::SessionCompleted(outcome) => completed = Some(outcome),
            }
        }
        completed
    }

    async fn finish(self, outcome: RunOutcome) -> Result<SessionEnd, SessionError> {
        self.status.send_replace(None);
        let (id, session) = self
            .history
            .record(&self.plan.technique_name, &outcome)
            .await?;
        tracing::info!(
            %id,
            elapsed = ?outcome.elapsed,
            cycles = outcome.cycles_completed,
            "session completed"
        );
        Ok(SessionEnd::Completed(session, id))
    }

    fn send(&self, update: SessionUpdate) {
        // Listeners are optional; a dropped receiver is not an error.
        let _ = self.updates.send(update);
    }

    fn publish_status(&self) {
        self.status.send_replace(self.controller.snapshot());
    }
}
