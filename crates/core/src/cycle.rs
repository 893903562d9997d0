//! Four-phase breathing cycle driven by fixed ticks.
//!
//! The controller is a pure state machine: the caller supplies elapsed time through
//! [`PhaseCycleController::tick`] and reacts to the returned [`CycleEvent`]s. It never
//! reads a clock, sleeps, or performs side effects itself.

use std::time::Duration;

use crate::model::{BreathingPattern, Phase};

/// Tick period used by the session timer.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Circle scale at the bottom of an exhale and during hold-after-exhale.
pub const CIRCLE_MIN_SCALE: f32 = 0.8;
/// Circle scale at the top of an inhale and during hold-after-inhale.
pub const CIRCLE_MAX_SCALE: f32 = 1.3;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Something the caller should react to after `start` or `tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// A phase was entered; phase-entry feedback should fire.
    PhaseEntered { phase: Phase, cycle_index: u32 },
    /// The cycle wrapped back to inhale.
    CycleCompleted { cycles_completed: u32 },
    /// The configured number of cycles has been reached and the run has ended.
    SessionCompleted(RunOutcome),
}

/// Final numbers of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub pattern: BreathingPattern,
    pub elapsed: Duration,
    pub cycles_completed: u32,
}

//
// ─── RUN STATE ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct SessionRun {
    pattern: BreathingPattern,
    phase: Phase,
    phase_remaining: Duration,
    cycle_index: u32,
    elapsed: Duration,
    paused: bool,
}

impl SessionRun {
    fn new(pattern: BreathingPattern) -> Self {
        Self {
            pattern,
            phase: Phase::Inhale,
            phase_remaining: pattern.duration_of(Phase::Inhale),
            cycle_index: 0,
            elapsed: Duration::ZERO,
            paused: false,
        }
    }

    /// Move past the current phase boundary, walking through zero-length phases in one go.
    ///
    /// Returns the outcome when the final cycle wraps. The final wrap still enters inhale
    /// so its cue fires, but the inhale countdown is not armed.
    fn advance(&mut self, events: &mut Vec<CycleEvent>) -> Option<RunOutcome> {
        loop {
            if self.phase.wraps() {
                self.cycle_index += 1;
                events.push(CycleEvent::CycleCompleted {
                    cycles_completed: self.cycle_index,
                });
                if self.cycle_index >= self.pattern.total_cycles() {
                    events.push(CycleEvent::PhaseEntered {
                        phase: self.phase.next(),
                        cycle_index: self.cycle_index,
                    });
                    return Some(RunOutcome {
                        pattern: self.pattern,
                        elapsed: self.elapsed,
                        cycles_completed: self.cycle_index,
                    });
                }
            }

            self.phase = self.phase.next();
            // Overshoot past the boundary is dropped, so non-multiples of the tick drift.
            self.phase_remaining = self.pattern.duration_of(self.phase);
            events.push(CycleEvent::PhaseEntered {
                phase: self.phase,
                cycle_index: self.cycle_index,
            });

            if !self.phase_remaining.is_zero() {
                return None;
            }
        }
    }
}

/// Read-only view of the active run, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSnapshot {
    pub phase: Phase,
    pub phase_remaining: Duration,
    pub phase_duration: Duration,
    pub cycle_index: u32,
    pub total_cycles: u32,
    pub elapsed: Duration,
    pub is_paused: bool,
}

impl RunSnapshot {
    /// Fraction of the current phase already elapsed, in `[0, 1]`.
    #[must_use]
    pub fn phase_progress(&self) -> f32 {
        if self.phase_duration.is_zero() {
            return 1.0;
        }
        let done = self.phase_duration.saturating_sub(self.phase_remaining);
        (done.as_secs_f32() / self.phase_duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Scale of the breathing circle: grows on inhale, shrinks on exhale, rests on holds.
    #[must_use]
    pub fn circle_scale(&self) -> f32 {
        let span = CIRCLE_MAX_SCALE - CIRCLE_MIN_SCALE;
        let progress = self.phase_progress();
        match self.phase {
            Phase::Inhale => CIRCLE_MIN_SCALE + span * progress,
            Phase::HoldAfterInhale => CIRCLE_MAX_SCALE,
            Phase::Exhale => CIRCLE_MAX_SCALE - span * progress,
            Phase::HoldAfterExhale => CIRCLE_MIN_SCALE,
        }
    }

    /// Whole seconds left in the phase, rounded up as shown on a countdown.
    #[must_use]
    pub fn phase_seconds_left(&self) -> u64 {
        self.phase_remaining.as_millis().div_ceil(1000) as u64
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns at most one breathing run and advances it on each tick.
#[derive(Debug, Clone, Default)]
pub struct PhaseCycleController {
    run: Option<SessionRun>,
}

impl PhaseCycleController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh run at the start of inhale. Replaces any run in progress.
    pub fn start(&mut self, pattern: BreathingPattern) -> Vec<CycleEvent> {
        self.run = Some(SessionRun::new(pattern));
        vec![CycleEvent::PhaseEntered {
            phase: Phase::Inhale,
            cycle_index: 0,
        }]
    }

    /// Account for `delta` of session time.
    ///
    /// Does nothing while idle or paused. When the current phase runs out the controller
    /// enters the next one; a wrap from hold-after-exhale counts a cycle, and the run ends
    /// on the tick that completes the final cycle.
    pub fn tick(&mut self, delta: Duration) -> Vec<CycleEvent> {
        let mut events = Vec::new();
        let Some(run) = self.run.as_mut() else {
            return events;
        };
        if run.paused {
            return events;
        }

        run.elapsed += delta;
        if delta < run.phase_remaining {
            run.phase_remaining -= delta;
            return events;
        }

        if let Some(outcome) = run.advance(&mut events) {
            self.run = None;
            events.push(CycleEvent::SessionCompleted(outcome));
        }
        events
    }

    /// Suspend time accrual. Returns `false` if there is no active run.
    pub fn pause(&mut self) -> bool {
        match self.run.as_mut() {
            Some(run) => {
                run.paused = true;
                true
            }
            None => false,
        }
    }

    /// Resume a paused run. Returns `false` if there is no active run.
    pub fn resume(&mut self) -> bool {
        match self.run.as_mut() {
            Some(run) => {
                run.paused = false;
                true
            }
            None => false,
        }
    }

    /// Discard the run without producing an outcome. Returns whether a run was active.
    pub fn stop(&mut self) -> bool {
        self.run.take().is_some()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.paused)
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<RunSnapshot> {
        self.run.as_ref().map(|run| RunSnapshot {
            phase: run.phase,
            phase_remaining: run.phase_remaining,
            phase_duration: run.pattern.duration_of(run.phase),
            cycle_index: run.cycle_index,
            total_cycles: run.pattern.total_cycles(),
            elapsed: run.elapsed,
            is_paused: run.paused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatternDraft;

    fn pattern(inhale: f64, hold_in: f64, exhale: f64, hold_out: f64, cycles: u32) -> BreathingPattern {
        PatternDraft::new(inhale, hold_in, exhale, hold_out, cycles)
            .validate()
            .unwrap()
    }

    /// Tick until the run ends, collecting every event. Panics if it never ends.
    fn run_to_completion(
        controller: &mut PhaseCycleController,
        delta: Duration,
    ) -> (Vec<CycleEvent>, usize) {
        let mut events = Vec::new();
        let mut ticks = 0;
        while controller.is_active() {
            events.extend(controller.tick(delta));
            ticks += 1;
            assert!(ticks < 1_000_000, "run never completed");
        }
        (events, ticks)
    }

    fn entered(events: &[CycleEvent]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|event| match event {
                CycleEvent::PhaseEntered { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    fn outcome(events: &[CycleEvent]) -> Option<RunOutcome> {
        events.iter().find_map(|event| match event {
            CycleEvent::SessionCompleted(outcome) => Some(*outcome),
            _ => None,
        })
    }

    #[test]
    fn start_enters_inhale() {
        let mut controller = PhaseCycleController::new();
        let events = controller.start(pattern(4.0, 4.0, 4.0, 4.0, 1));
        assert_eq!(
            events,
            vec![CycleEvent::PhaseEntered {
                phase: Phase::Inhale,
                cycle_index: 0
            }]
        );
        let snap = controller.snapshot().unwrap();
        assert_eq!(snap.phase, Phase::Inhale);
        assert_eq!(snap.phase_remaining, Duration::from_secs(4));
        assert_eq!(snap.cycle_index, 0);
        assert_eq!(snap.elapsed, Duration::ZERO);
        assert!(!snap.is_paused);
    }

    #[test]
    fn box_breathing_single_cycle() {
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(4.0, 4.0, 4.0, 4.0, 1));
        let (events, ticks) = run_to_completion(&mut controller, DEFAULT_TICK);

        assert_eq!(ticks, 160);
        // start entered inhale; the ticks produce the four transitions
        assert_eq!(
            entered(&events),
            vec![
                Phase::HoldAfterInhale,
                Phase::Exhale,
                Phase::HoldAfterExhale,
                Phase::Inhale
            ]
        );
        let wraps = events
            .iter()
            .filter(|e| matches!(e, CycleEvent::CycleCompleted { .. }))
            .count();
        assert_eq!(wraps, 1);

        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CycleEvent::SessionCompleted(_)))
            .collect();
        assert_eq!(completions.len(), 1);
        let outcome = outcome(&events).unwrap();
        assert_eq!(outcome.elapsed, Duration::from_secs(16));
        assert_eq!(outcome.cycles_completed, 1);
        assert!(controller.snapshot().is_none());
    }

    #[test]
    fn final_wrap_enters_inhale_before_completing() {
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(4.0, 4.0, 4.0, 4.0, 1));
        let (events, _) = run_to_completion(&mut controller, DEFAULT_TICK);

        let tail = &events[events.len() - 3..];
        assert_eq!(tail[0], CycleEvent::CycleCompleted { cycles_completed: 1 });
        assert_eq!(
            tail[1],
            CycleEvent::PhaseEntered {
                phase: Phase::Inhale,
                cycle_index: 1
            }
        );
        assert!(matches!(tail[2], CycleEvent::SessionCompleted(_)));
        // the inhale is cued but never timed
        assert_eq!(outcome(&events).unwrap().elapsed, Duration::from_secs(16));
        assert!(!controller.is_active());
    }

    #[test]
    fn wim_hof_zero_holds_are_entered_without_time() {
        let mut controller = PhaseCycleController::new();
        let start = controller.start(pattern(2.0, 0.0, 1.0, 0.0, 30));
        let (events, ticks) = run_to_completion(&mut controller, DEFAULT_TICK);

        let mut all = start;
        all.extend(events.iter().cloned());
        let phases = entered(&all);
        let holds_in = phases.iter().filter(|p| **p == Phase::HoldAfterInhale).count();
        let holds_out = phases.iter().filter(|p| **p == Phase::HoldAfterExhale).count();
        assert_eq!(holds_in, 30);
        assert_eq!(holds_out, 30);
        // 30 cycles of 3 seconds; the holds add nothing
        assert_eq!(ticks, 900);
        assert_eq!(outcome(&events).unwrap().elapsed, Duration::from_secs(90));
    }

    #[test]
    fn zero_hold_is_entered_and_left_in_the_same_tick() {
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(0.1, 0.0, 0.2, 4.0, 2));
        let events = controller.tick(DEFAULT_TICK);
        assert_eq!(entered(&events), vec![Phase::HoldAfterInhale, Phase::Exhale]);
        let snap = controller.snapshot().unwrap();
        assert_eq!(snap.phase, Phase::Exhale);
        assert_eq!(snap.phase_remaining, Duration::from_millis(200));
        assert_eq!(snap.elapsed, DEFAULT_TICK);
    }

    #[test]
    fn cycle_index_increments_only_on_wrap() {
        let patterns = [
            pattern(4.0, 4.0, 4.0, 4.0, 3),
            pattern(4.0, 7.0, 8.0, 0.0, 2),
            pattern(0.5, 0.0, 0.3, 0.0, 20),
            pattern(5.5, 0.0, 5.5, 0.0, 2),
            pattern(1.0, 0.0, 1.0, 0.0, 10),
        ];
        let deltas = [
            Duration::from_millis(100),
            Duration::from_millis(30),
            Duration::from_millis(250),
            Duration::from_millis(1000),
        ];

        for p in patterns {
            for delta in deltas {
                let mut controller = PhaseCycleController::new();
                controller.start(p);
                let mut last_phase = Phase::Inhale;
                let mut expected_cycles = 0;

                while controller.is_active() {
                    for event in controller.tick(delta) {
                        match event {
                            CycleEvent::PhaseEntered { phase, cycle_index } => {
                                if phase == Phase::Inhale {
                                    assert_eq!(last_phase, Phase::HoldAfterExhale);
                                }
                                assert_eq!(phase, last_phase.next());
                                assert_eq!(cycle_index, expected_cycles);
                                last_phase = phase;
                            }
                            CycleEvent::CycleCompleted { cycles_completed } => {
                                assert_eq!(last_phase, Phase::HoldAfterExhale);
                                expected_cycles += 1;
                                assert_eq!(cycles_completed, expected_cycles);
                            }
                            CycleEvent::SessionCompleted(outcome) => {
                                assert_eq!(outcome.cycles_completed, p.total_cycles());
                                assert_eq!(expected_cycles, p.total_cycles());
                            }
                        }
                    }
                }
                assert_eq!(expected_cycles, p.total_cycles());
            }
        }
    }

    #[test]
    fn completes_on_the_wrap_tick_not_later() {
        let p = pattern(1.0, 1.0, 1.0, 1.0, 2);
        let mut controller = PhaseCycleController::new();
        controller.start(p);
        let mut tick_of_last_wrap = None;
        let mut tick_of_completion = None;
        let mut tick = 0;
        while controller.is_active() {
            tick += 1;
            for event in controller.tick(DEFAULT_TICK) {
                match event {
                    CycleEvent::CycleCompleted { cycles_completed: 2 } => {
                        tick_of_last_wrap = Some(tick);
                    }
                    CycleEvent::SessionCompleted(_) => tick_of_completion = Some(tick),
                    _ => {}
                }
            }
        }
        assert_eq!(tick_of_last_wrap, Some(80));
        assert_eq!(tick_of_completion, tick_of_last_wrap);
    }

    #[test]
    fn pause_freezes_time_and_resume_matches_uninterrupted_run() {
        let p = pattern(4.0, 4.0, 4.0, 4.0, 2);

        let mut reference = PhaseCycleController::new();
        reference.start(p);
        let (reference_events, reference_ticks) = run_to_completion(&mut reference, DEFAULT_TICK);

        let mut paused = PhaseCycleController::new();
        paused.start(p);
        let mut events = Vec::new();
        for _ in 0..37 {
            events.extend(paused.tick(DEFAULT_TICK));
        }
        assert!(paused.pause());
        let before = paused.snapshot().unwrap();
        for _ in 0..500 {
            assert!(paused.tick(DEFAULT_TICK).is_empty());
        }
        let after = paused.snapshot().unwrap();
        assert_eq!(before.phase_remaining, after.phase_remaining);
        assert_eq!(before.elapsed, after.elapsed);
        assert!(after.is_paused);

        assert!(paused.resume());
        let (rest, rest_ticks) = run_to_completion(&mut paused, DEFAULT_TICK);
        events.extend(rest);

        assert_eq!(37 + rest_ticks, reference_ticks);
        assert_eq!(events, reference_events);
    }

    #[test]
    fn stop_discards_without_outcome() {
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(4.0, 4.0, 4.0, 4.0, 1));
        controller.tick(DEFAULT_TICK);
        assert!(controller.stop());
        assert!(!controller.is_active());
        assert!(controller.tick(DEFAULT_TICK).is_empty());
        assert!(!controller.stop());
        assert!(!controller.pause());
        assert!(!controller.resume());
    }

    #[test]
    fn no_automatic_restart_after_completion() {
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(1.0, 0.0, 1.0, 0.0, 1));
        let _ = run_to_completion(&mut controller, DEFAULT_TICK);
        assert!(controller.tick(DEFAULT_TICK).is_empty());
        assert!(!controller.is_active());
    }

    #[test]
    fn overshoot_is_dropped() {
        // 250ms phases ticked at 100ms: each phase takes three ticks.
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(0.25, 0.25, 0.25, 0.25, 1));
        let (events, ticks) = run_to_completion(&mut controller, DEFAULT_TICK);
        assert_eq!(ticks, 12);
        assert_eq!(outcome(&events).unwrap().elapsed, Duration::from_millis(1200));
    }

    #[test]
    fn snapshot_geometry() {
        let mut controller = PhaseCycleController::new();
        controller.start(pattern(4.0, 4.0, 4.0, 4.0, 1));
        let snap = controller.snapshot().unwrap();
        assert!((snap.circle_scale() - 0.8).abs() < 1e-6);
        assert_eq!(snap.phase_seconds_left(), 4);

        for _ in 0..20 {
            controller.tick(DEFAULT_TICK);
        }
        let snap = controller.snapshot().unwrap();
        assert!((snap.phase_progress() - 0.5).abs() < 1e-6);
        assert!((snap.circle_scale() - 1.05).abs() < 1e-5);

        controller.tick(Duration::from_millis(1950));
        let snap = controller.snapshot().unwrap();
        assert_eq!(snap.phase_seconds_left(), 1);
    }
}
