//! The session loop.
//!
//! [`SessionController::start_session`] runs pomodoros and breaks back to back
//! until the session is ended by the user or runs out of tasks. It suspends
//! only inside the countdown tick; every read and write between two ticks
//! happens under the context lock, so user actions arriving in between are
//! applied atomically with respect to the loop.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::announcements::{
    break_prompt, focus_announcement, NO_TASKS_ANNOUNCEMENT, SESSION_ENDED_ANNOUNCEMENT,
    TASK_DONE_ANNOUNCEMENT, TASK_NOT_DONE_ANNOUNCEMENT,
};
use super::context::SessionContext;
use super::settings::{Settings, SettingsReport};
use super::summary::SessionSummary;
use crate::error::Result;
use crate::notify::{Notifier, Visibility};
use crate::store::{Action, Field, Handler, SessionState, SessionStatus, NO_TASKS_SENTINEL};
use crate::task::{FormOutcome, Task, TaskFormError};
use crate::timer::{count_down, CountdownHost, IntervalKind, Ticker};
use crate::validation::{validate_pomodoro_estimate, whole_number};

/// Where the controller is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    Inactive,
    RunningPomodoro,
    RunningShortBreak,
    RunningLongBreak,
}

impl ControllerPhase {
    fn of(state: &SessionState) -> Self {
        match (state.session, state.current_interval) {
            (SessionStatus::Inactive, _) => ControllerPhase::Inactive,
            (SessionStatus::Active, IntervalKind::Pomodoro) => ControllerPhase::RunningPomodoro,
            (SessionStatus::Active, IntervalKind::ShortBreak) => ControllerPhase::RunningShortBreak,
            (SessionStatus::Active, IntervalKind::LongBreak) => ControllerPhase::RunningLongBreak,
        }
    }
}

pub struct SessionController {
    ctx: Mutex<SessionContext>,
    ticker: Arc<dyn Ticker>,
    notifier: Arc<dyn Notifier>,
}

/// Countdown host bound to one interval of one session run.
struct Run<'a> {
    controller: &'a SessionController,
    generation: u64,
    kind: IntervalKind,
}

impl CountdownHost for Run<'_> {
    fn publish_if_active(&self, seconds: u32) -> bool {
        let mut ctx = self.controller.lock();
        if !ctx.runs(self.generation) {
            return false;
        }
        ctx.store.dispatch(Action::SetCurrentTime(seconds));
        true
    }

    fn complete_if_active(&self) -> Result<bool> {
        let mut ctx = self.controller.lock();
        if !ctx.runs(self.generation) {
            return Ok(false);
        }
        if self.kind == IntervalKind::Pomodoro {
            self.controller.credit_pomodoro(&mut ctx)?;
        }
        Ok(true)
    }
}

impl SessionController {
    pub fn new(context: SessionContext, ticker: Arc<dyn Ticker>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ctx: Mutex::new(context),
            ticker,
            notifier,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.lock().store.state().clone()
    }

    pub fn phase(&self) -> ControllerPhase {
        ControllerPhase::of(self.lock().store.state())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.tasks().to_vec()
    }

    pub fn settings(&self) -> Settings {
        Settings::from_state(self.lock().store.state())
    }

    /// Register store subscribers; returns the current snapshot.
    pub fn subscribe<I>(&self, handlers: I) -> SessionState
    where
        I: IntoIterator<Item = (Field, Handler)>,
    {
        self.lock().store.subscribe(handlers)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Activate the session and run it until it ends.
    ///
    /// Returns immediately if a session is already running. Returns when the
    /// user ends the session (within one tick) or when no task is left.
    pub async fn start_session(&self) -> Result<()> {
        let generation = {
            let mut ctx = self.lock();
            if ctx.store.state().is_active() {
                tracing::debug!("start ignored, session already active");
                return Ok(());
            }
            ctx.generation += 1;
            ctx.store.dispatch(Action::SetSession(SessionStatus::Active));
            ctx.tasks.set_usability(false);
            tracing::info!(generation = ctx.generation, "session started");
            ctx.generation
        };
        self.run(generation).await
    }

    /// The start/stop button. Runs a session when none is active; otherwise
    /// asks the user to confirm ending it and returns at once.
    pub async fn toggle_session(&self) -> Result<()> {
        if self.request_end_session() {
            return Ok(());
        }
        self.start_session().await
    }

    /// Ask for confirmation before ending a running session.
    ///
    /// Returns whether a confirmation was requested.
    pub fn request_end_session(&self) -> bool {
        let ctx = self.lock();
        if !ctx.store.state().is_active() {
            return false;
        }
        self.notifier.open_confirmation();
        true
    }

    /// End the running session. The loop notices at its next tick.
    ///
    /// Returns whether there was a session to end.
    pub fn end_session(&self) -> bool {
        let mut ctx = self.lock();
        if !ctx.store.state().is_active() {
            return false;
        }
        ctx.store.dispatch(Action::SetSession(SessionStatus::Inactive));
        self.finalize(&mut ctx);
        true
    }

    /// The "end" answer of the confirmation dialog.
    pub fn confirm_end_session(&self) -> bool {
        self.end_session()
    }

    /// Answer to the break prompt ("did you finish the task?").
    ///
    /// Only the first answer during a running break counts; returns whether
    /// this one did.
    pub fn answer_task_completed(&self, completed: bool) -> Result<bool> {
        let mut ctx = self.lock();
        let state = ctx.store.state();
        if !state.is_active() || !state.current_interval.is_break() || ctx.announcement_clicked {
            tracing::debug!(completed, "break answer ignored");
            return Ok(false);
        }
        ctx.announcement_clicked = true;
        self.resolve_break(&mut ctx, completed, true)?;
        Ok(true)
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Apply the settings form. Invalid fields keep their old value and are
    /// flagged in the report; nothing changes while a session runs.
    pub fn save_settings(
        &self,
        short_break: &str,
        long_break: &str,
        timer_audio: &str,
    ) -> Result<SettingsReport> {
        let mut ctx = self.lock();
        if ctx.store.state().is_active() {
            return Ok(SettingsReport {
                ignored_while_active: true,
                ..SettingsReport::default()
            });
        }

        let current = Settings::from_state(ctx.store.state());
        let (next, report) = current.merged(short_break, long_break, timer_audio);
        next.persist(ctx.tasks.storage_mut())?;

        if !report.short_break_rejected {
            ctx.store.dispatch(Action::SetShortBreakLength(next.short_break_length));
        }
        if !report.long_break_rejected {
            ctx.store.dispatch(Action::SetLongBreakLength(next.long_break_length));
        }
        if !report.timer_audio_rejected {
            ctx.store.dispatch(Action::SetTimerAudio(next.timer_audio));
        }
        Ok(report)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// The task form: name plus estimated pomodoros as typed.
    pub fn submit_task(&self, name: &str, estimated_pomodoros: &str) -> Result<FormOutcome> {
        let Some(estimate) = validate_pomodoro_estimate(estimated_pomodoros) else {
            return Ok(FormOutcome::Rejected(TaskFormError::InvalidEstimate));
        };
        let mut ctx = self.lock();
        let mut task = Task::new(name, whole_number(estimate));
        task.interactive = !ctx.store.state().is_active();
        ctx.tasks.add(task)
    }

    pub fn delete_task(&self, name: &str) -> Result<bool> {
        let mut ctx = self.lock();
        if !Self::accepts_input(&ctx, name) {
            return Ok(false);
        }
        let deleted = ctx.tasks.delete(name)?;
        ctx.sync_selected();
        Ok(deleted)
    }

    pub fn finish_task(&self, name: &str) -> Result<bool> {
        let mut ctx = self.lock();
        if !Self::accepts_input(&ctx, name) {
            return Ok(false);
        }
        let finished = ctx.tasks.complete(name)?;
        ctx.sync_selected();
        Ok(finished)
    }

    pub fn select_task(&self, name: &str) -> Result<bool> {
        let mut ctx = self.lock();
        if !Self::accepts_input(&ctx, name) {
            return Ok(false);
        }
        let selected = ctx.tasks.select(name)?;
        ctx.sync_selected();
        Ok(selected)
    }

    /// The edit form. Fields left as `None` keep their value.
    pub fn edit_task(
        &self,
        name: &str,
        new_name: Option<&str>,
        estimated_pomodoros: Option<&str>,
    ) -> Result<FormOutcome> {
        let estimate = match estimated_pomodoros {
            Some(raw) => match validate_pomodoro_estimate(raw) {
                Some(v) => Some(whole_number(v)),
                None => return Ok(FormOutcome::Rejected(TaskFormError::InvalidEstimate)),
            },
            None => None,
        };
        let mut ctx = self.lock();
        let outcome = ctx.tasks.edit(name, new_name, estimate)?;
        ctx.sync_selected();
        Ok(outcome)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, SessionContext> {
        self.ctx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn accepts_input(ctx: &SessionContext, name: &str) -> bool {
        match ctx.tasks.get(name) {
            Some(task) if !task.interactive => {
                tracing::warn!(task = name, "task is not accepting input right now");
                false
            }
            Some(_) => true,
            None => {
                tracing::warn!(task = name, "action on unknown task ignored");
                false
            }
        }
    }

    async fn run(&self, generation: u64) -> Result<()> {
        loop {
            let interval = {
                let ctx = self.lock();
                if !ctx.runs(generation) {
                    return Ok(());
                }
                ctx.store.state().current_interval
            };

            if interval.is_break() {
                let seconds = {
                    let mut ctx = self.lock();
                    ctx.announcement_clicked = false;
                    ctx.store.state().interval_secs(interval)
                };
                tracing::debug!(%interval, seconds, "break started");

                let host = Run {
                    controller: self,
                    generation,
                    kind: interval,
                };
                let outcome = count_down(&host, self.ticker.as_ref(), seconds).await?;

                {
                    let mut ctx = self.lock();
                    if ctx.generation != generation {
                        return Ok(());
                    }
                    if !ctx.announcement_clicked {
                        self.resolve_break(&mut ctx, false, false)?;
                    }
                    ctx.store.dispatch(Action::SetCurrentInterval(IntervalKind::Pomodoro));
                }
                if outcome.is_interrupted() {
                    return Ok(());
                }
                continue;
            }

            let seconds = {
                let mut ctx = self.lock();
                match Self::ensure_selected(&mut ctx)? {
                    Some(task) => {
                        self.notifier.set_announcement(&focus_announcement(&task));
                        self.notifier.set_button_visibility(Visibility::Hidden);
                        ctx.store.state().interval_secs(IntervalKind::Pomodoro)
                    }
                    None => {
                        if ctx.store.state().number_of_pomodoros_completed == 0 {
                            ctx.store
                                .dispatch(Action::SetNumberOfPomodorosCompleted(NO_TASKS_SENTINEL));
                        }
                        ctx.store.dispatch(Action::SetSession(SessionStatus::Inactive));
                        tracing::info!("no task available, ending session");
                        self.finalize(&mut ctx);
                        return Ok(());
                    }
                }
            };
            tracing::debug!(seconds, "pomodoro started");

            let host = Run {
                controller: self,
                generation,
                kind: IntervalKind::Pomodoro,
            };
            if count_down(&host, self.ticker.as_ref(), seconds)
                .await?
                .is_interrupted()
            {
                return Ok(());
            }
        }
    }

    /// Credit a finished pomodoro and move on to its break. Runs under the
    /// same lock as the final active check, so an ended session is never
    /// credited.
    fn credit_pomodoro(&self, ctx: &mut SessionContext) -> Result<()> {
        let task = ctx.tasks.selected().map(|t| t.name.clone());
        if let Some(name) = &task {
            ctx.tasks.increment_pomodoro(name)?;
        }
        let completed = ctx.store.state().number_of_pomodoros_completed + 1;
        ctx.store
            .dispatch(Action::SetNumberOfPomodorosCompleted(completed));
        let next = IntervalKind::break_after(completed);
        ctx.store.dispatch(Action::SetCurrentInterval(next));
        tracing::debug!(completed, %next, "pomodoro completed");

        self.notifier
            .set_announcement(&break_prompt(next, task.as_deref().unwrap_or_default()));
        self.notifier.set_button_visibility(Visibility::Visible);
        Ok(())
    }

    /// The selected task, selecting the head of the list if nothing is.
    fn ensure_selected(ctx: &mut SessionContext) -> Result<Option<String>> {
        if let Some(task) = ctx.tasks.selected() {
            let name = task.name.clone();
            ctx.sync_selected();
            return Ok(Some(name));
        }
        let picked = ctx.tasks.select_first()?;
        ctx.sync_selected();
        Ok(picked)
    }

    /// Apply the outcome of the break prompt. `explicit` is false for the
    /// default applied when the break ran out without an answer.
    fn resolve_break(&self, ctx: &mut SessionContext, completed: bool, explicit: bool) -> Result<()> {
        if completed {
            if let Some(name) = ctx.tasks.selected().map(|t| t.name.clone()) {
                ctx.tasks.complete(&name)?;
            }
            ctx.sync_selected();
        }
        if explicit {
            self.notifier.set_announcement(if completed {
                TASK_DONE_ANNOUNCEMENT
            } else {
                TASK_NOT_DONE_ANNOUNCEMENT
            });
        }
        self.notifier.set_button_visibility(Visibility::Hidden);
        Ok(())
    }

    /// Runs once per session end, however it ended.
    fn finalize(&self, ctx: &mut SessionContext) {
        let completed = ctx.store.state().number_of_pomodoros_completed;
        self.notifier.set_announcement(if completed == NO_TASKS_SENTINEL {
            NO_TASKS_ANNOUNCEMENT
        } else {
            SESSION_ENDED_ANNOUNCEMENT
        });
        self.notifier.set_button_visibility(Visibility::Hidden);

        if completed > 0 {
            let summary = SessionSummary::from_tasks(ctx.tasks.tasks(), completed.unsigned_abs());
            self.notifier.open_summary(&summary);
        }

        ctx.store.dispatch(Action::SetNumberOfPomodorosCompleted(0));
        ctx.store.dispatch(Action::SetCurrentTime(0));
        ctx.tasks.set_usability(true);
        tracing::info!(pomodoros = completed.max(0), "session ended");
    }
}
