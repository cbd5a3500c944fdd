// Sequence scheduler: activates steps at staggered offsets on a logical millisecond clock.
// The host drives the clock with `tick`; every pending timer is a token the scheduler owns,
// so pause/reset/play can always drain them and nothing fires after cancellation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::accessibility::MotionGate;
use crate::stagger::StaggerDistributor;
use crate::types::{Direction, Millis, SequenceOptions};

/// Pause between the final step and the next loop iteration.
pub const LOOP_PAUSE: Millis = Millis::from_millis(1000);

/// Cancellation token for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    Activate(usize),
    Restart,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    id: TimerId,
    deadline: Millis,
    action: TimerAction,
}

/// Lifecycle of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencePhase {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// What happened during a `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SequenceEvent {
    StepActivated { step: usize, at: Millis },
    Completed { at: Millis },
    Restarted { at: Millis },
}

/// Mutable sequence state, owned by exactly one scheduler.
#[derive(Debug, Clone)]
pub struct SequenceState {
    /// `None` until the first step activates.
    pub current_step: Option<usize>,
    pub phase: SequencePhase,
    pending: VecDeque<PendingTimer>,
}

impl Default for SequenceState {
    fn default() -> Self {
        SequenceState {
            current_step: None,
            phase: SequencePhase::Idle,
            pending: VecDeque::new(),
        }
    }
}

/// Stateful controller for a staggered reveal.
#[derive(Debug)]
pub struct SequenceScheduler {
    options: SequenceOptions,
    distributor: StaggerDistributor,
    gate: MotionGate,
    clock: Millis,
    state: SequenceState,
    next_timer: u64,
}

impl SequenceScheduler {
    pub fn new(options: SequenceOptions, gate: MotionGate) -> Self {
        SequenceScheduler {
            options,
            distributor: StaggerDistributor::new(gate.clone()),
            gate,
            clock: Millis::ZERO,
            state: SequenceState::default(),
            next_timer: 0,
        }
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    /// Replace the options. Any run in progress is reset.
    pub fn set_options(&mut self, options: SequenceOptions) {
        self.reset();
        self.options = options;
    }

    /// Start from the first step, superseding any previous run.
    pub fn play(&mut self) {
        let cancelled = self.cancel_all();
        self.state.current_step = None;

        let steps = self.options.step_count();
        if steps == 0 {
            self.state.phase = SequencePhase::Completed;
            return;
        }

        if self.gate.is_reduced_motion_preferred() {
            // No motion at all: land on the final state synchronously.
            self.jump_to_final();
            return;
        }

        self.schedule_run(self.clock);
        self.state.phase = SequencePhase::Playing;
        tracing::debug!(
            steps,
            cancelled,
            pending = self.state.pending.len(),
            "sequence playing"
        );
    }

    /// Stop firing. The current step is kept; resuming requires `play()`.
    pub fn pause(&mut self) {
        let cancelled = self.cancel_all();
        if matches!(
            self.state.phase,
            SequencePhase::Playing | SequencePhase::Completed
        ) && cancelled > 0
        {
            self.state.phase = SequencePhase::Paused;
        }
        tracing::debug!(cancelled, current_step = ?self.state.current_step, "sequence paused");
    }

    /// Stop firing and rewind to "not started".
    pub fn reset(&mut self) {
        let cancelled = self.cancel_all();
        self.state.current_step = None;
        self.state.phase = SequencePhase::Idle;
        tracing::debug!(cancelled, "sequence reset");
    }

    /// Advance the logical clock and fire every timer that is now due, in deadline order.
    pub fn tick(&mut self, elapsed: Millis) -> Vec<SequenceEvent> {
        self.clock = self.clock.saturating_add(elapsed);
        let mut events = Vec::new();

        while let Some(timer) = self.pop_due() {
            // The preference may have flipped since these timers were scheduled.
            if self.gate.is_reduced_motion_preferred() {
                self.cancel_all();
                if let Some(step) = self.jump_to_final() {
                    events.push(SequenceEvent::StepActivated {
                        step,
                        at: timer.deadline,
                    });
                }
                events.push(SequenceEvent::Completed { at: timer.deadline });
                break;
            }

            match timer.action {
                TimerAction::Activate(step) => {
                    tracing::trace!(timer = timer.id.as_u64(), step, "step activated");
                    self.state.current_step = Some(step);
                    events.push(SequenceEvent::StepActivated {
                        step,
                        at: timer.deadline,
                    });

                    if self.state.pending.is_empty() {
                        self.state.phase = SequencePhase::Completed;
                        events.push(SequenceEvent::Completed { at: timer.deadline });
                        tracing::debug!(at = timer.deadline.as_millis(), "sequence completed");

                        if self.options.looping {
                            let restart_at = timer.deadline.saturating_add(LOOP_PAUSE);
                            self.push_timer(restart_at, TimerAction::Restart);
                        }
                    }
                }
                TimerAction::Restart => {
                    self.state.current_step = None;
                    events.push(SequenceEvent::Restarted { at: timer.deadline });

                    // Schedule from the restart deadline so loops do not drift with tick size.
                    self.schedule_run(timer.deadline);
                    self.state.phase = SequencePhase::Playing;
                    tracing::debug!(at = timer.deadline.as_millis(), "sequence restarted");
                }
            }
        }

        events
    }

    /// Whether `step` should currently show its animated state.
    pub fn should_animate_step(&self, step: usize) -> bool {
        match self.state.current_step {
            None => false,
            Some(current) => match self.options.direction {
                Direction::Forward => step <= current,
                Direction::Reverse => step >= current,
            },
        }
    }

    pub fn current_step(&self) -> Option<usize> {
        self.state.current_step
    }

    pub fn is_playing(&self) -> bool {
        !self.state.pending.is_empty()
    }

    pub fn phase(&self) -> SequencePhase {
        self.state.phase
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    pub fn clock(&self) -> Millis {
        self.clock
    }

    pub fn pending_timer_count(&self) -> usize {
        self.state.pending.len()
    }

    /// Deadlines of the outstanding timers, earliest first.
    pub fn pending_deadlines(&self) -> Vec<Millis> {
        self.state.pending.iter().map(|t| t.deadline).collect()
    }

    /// Time until the next timer is due, for hosts that sleep between ticks.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.state.pending.front().map(|timer| {
            Millis::from_millis(
                timer
                    .deadline
                    .as_millis()
                    .saturating_sub(self.clock.as_millis()),
            )
        })
    }

    /// Land on the final step in reveal order with nothing scheduled.
    fn jump_to_final(&mut self) -> Option<usize> {
        let steps = self.options.step_count();
        let last = steps.checked_sub(1).map(|logical| self.options.physical_step(logical));
        self.state.current_step = last;
        self.state.phase = SequencePhase::Completed;
        tracing::debug!(steps, ?last, "reduced motion, sequence jumped to final step");
        last
    }

    fn schedule_run(&mut self, origin: Millis) {
        let offsets = self.distributor.offsets(&self.options);
        for (logical, offset) in offsets.into_iter().enumerate() {
            let step = self.options.physical_step(logical);
            let deadline = origin.saturating_add(Millis::from_secs_f64(offset));
            self.push_timer(deadline, TimerAction::Activate(step));
        }
    }

    fn push_timer(&mut self, deadline: Millis, action: TimerAction) {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        // Offsets are non-decreasing, so appending keeps the queue ordered.
        debug_assert!(self
            .state
            .pending
            .back()
            .map_or(true, |last| last.deadline <= deadline));
        self.state.pending.push_back(PendingTimer {
            id,
            deadline,
            action,
        });
    }

    fn pop_due(&mut self) -> Option<PendingTimer> {
        match self.state.pending.front() {
            Some(timer) if timer.deadline <= self.clock => self.state.pending.pop_front(),
            _ => None,
        }
    }

    fn cancel_all(&mut self) -> usize {
        let cancelled = self.state.pending.len();
        for timer in self.state.pending.drain(..) {
            tracing::trace!(timer = timer.id.as_u64(), "timer cancelled");
        }
        cancelled
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// WASM-exposed scheduler. Created through `MotionEngine::sequence`.
///
/// The host calls `tick(elapsed_ms)` from its frame or timer loop. Activated
/// steps are returned as JSON and, if subscribed, passed to the callback one
/// step at a time.
#[wasm_bindgen]
pub struct WasmSequenceScheduler {
    inner: SequenceScheduler,
    subscriber: Option<js_sys::Function>,
}

impl WasmSequenceScheduler {
    pub(crate) fn new(inner: SequenceScheduler) -> Self {
        WasmSequenceScheduler {
            inner,
            subscriber: None,
        }
    }
}

#[wasm_bindgen]
impl WasmSequenceScheduler {
    pub fn play(&mut self) {
        self.inner.play();
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Advance by `elapsed_ms` and return the fired events as JSON.
    pub fn tick(&mut self, elapsed_ms: f64) -> Result<String, JsValue> {
        let events = self.inner.tick(Millis::from_f64_lossy(elapsed_ms));

        if let Some(callback) = &self.subscriber {
            for event in &events {
                if let SequenceEvent::StepActivated { step, .. } = event {
                    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from(*step as u32)) {
                        tracing::warn!(?err, step, "step subscriber threw");
                    }
                }
            }
        }

        serde_json::to_string(&events)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Current step, or -1 when the sequence has not started.
    pub fn current_step(&self) -> i32 {
        self.inner
            .current_step()
            .map_or(-1, |step| i32::try_from(step).unwrap_or(i32::MAX))
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn should_animate_step(&self, step: i32) -> bool {
        usize::try_from(step).is_ok_and(|step| self.inner.should_animate_step(step))
    }

    pub fn pending_timers(&self) -> u32 {
        u32::try_from(self.inner.pending_timer_count()).unwrap_or(u32::MAX)
    }

    /// Milliseconds until the next timer fires, if any.
    pub fn next_deadline_ms(&self) -> Option<f64> {
        self.inner.next_deadline().map(|ms| ms.as_millis() as f64)
    }

    /// Call `callback(step)` for every step activated by `tick`.
    pub fn subscribe(&mut self, callback: js_sys::Function) {
        self.subscriber = Some(callback);
    }

    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }
}
