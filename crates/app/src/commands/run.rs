use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use serene_core::cycle::{CIRCLE_MAX_SCALE, CIRCLE_MIN_SCALE, RunSnapshot};
use serene_core::feedback::ToneSpec;
use serene_core::model::{FeedbackSettings, Phase};
use serene_core::stats::{format_clock, format_duration};
use services::{AppServices, PlanOverrides, SessionControls, SessionEnd, SessionUpdate, SessionView};
use tokio::sync::mpsc;

use crate::devices::{TerminalVibrator, tone_player};

const BAR_WIDTH: usize = 24;

/// Stdin lines read on a plain thread; an idle blocking read must not hold up shutdown.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn breath_bar(view: &SessionView) -> String {
    let span = CIRCLE_MAX_SCALE - CIRCLE_MIN_SCALE;
    let fill = ((view.circle_scale - CIRCLE_MIN_SCALE) / span).clamp(0.0, 1.0);
    let filled = (fill * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn render_status(snapshot: Option<RunSnapshot>) {
    let Some(snapshot) = snapshot else { return };
    let view = SessionView::from_snapshot(&snapshot);
    let paused = if view.is_paused { "  [paused]" } else { "" };
    print!(
        "\r{:<12} {:>3}s  cycle {}/{}  {:>6}  [{}]{paused}   ",
        view.label,
        view.seconds_left,
        view.cycle,
        view.total_cycles,
        view.clock,
        breath_bar(&view)
    );
    let _ = std::io::stdout().flush();
}

/// Prints session updates; the inhale cue that closes the last cycle is not announced.
#[derive(Debug, Default)]
struct UpdatePrinter {
    finished: bool,
}

impl UpdatePrinter {
    fn line(&mut self, update: &SessionUpdate) -> Option<String> {
        match update {
            SessionUpdate::PhaseEntered { .. } if self.finished => None,
            SessionUpdate::PhaseEntered {
                phase,
                phase_duration,
                ..
            } if !phase_duration.is_zero() => Some(format!(
                "\n{} for {}",
                phase.label(),
                format_clock(*phase_duration)
            )),
            SessionUpdate::PhaseEntered { .. } => None,
            SessionUpdate::CycleCompleted {
                cycles_completed,
                total_cycles,
            } => {
                self.finished = cycles_completed >= total_cycles;
                Some(format!("\n-- cycle {cycles_completed}/{total_cycles} complete"))
            }
            SessionUpdate::Paused => Some("\nPaused. Type p to resume.".to_owned()),
            SessionUpdate::Resumed => Some("\nResumed.".to_owned()),
        }
    }

    fn print(&mut self, update: &SessionUpdate) {
        if let Some(line) = self.line(update) {
            println!("{line}");
        }
    }
}

fn closing_tone(settings: FeedbackSettings) -> Option<ToneSpec> {
    if !settings.sound_active() {
        return None;
    }
    ToneSpec::for_phase(settings.sound_type(), Phase::Inhale)
}

fn handle_input(line: &str, controls: &SessionControls, snapshot: Option<RunSnapshot>) {
    match line.trim() {
        "p" | "P" => {
            if snapshot.is_some_and(|s| s.is_paused) {
                controls.resume();
            } else {
                controls.pause();
            }
        }
        "q" | "Q" => {
            controls.stop();
        }
        "" => {}
        other => println!("\nUnknown input {other:?}: p pauses or resumes, q stops."),
    }
}

pub async fn run(app: &AppServices, source: Option<&str>, overrides: PlanOverrides) -> Result<()> {
    let plan = match source {
        Some(source) => app.library().plan(source, overrides).await?,
        None => app.library().ad_hoc_plan(overrides)?,
    };
    let pattern = plan.pattern;

    println!("{}", plan.technique_name);
    println!(
        "{} x {} cycles, about {}",
        pattern.notation(),
        pattern.total_cycles(),
        format_duration(pattern.nominal_duration().as_secs())
    );
    for warning in plan.warnings {
        println!("! {warning}");
    }
    println!("Type p + Enter to pause or resume, q + Enter to stop. Ctrl-C also stops.");

    let feedback = app.feedback(Arc::new(TerminalVibrator), tone_player()).await?;
    let settings = feedback.settings();
    let mut handle = app.sessions(feedback).start(plan);
    let mut updates = handle
        .take_updates()
        .context("session update stream already taken")?;
    let controls = handle.controls();
    let mut status = handle.watch_status();
    let mut input = spawn_line_reader();

    let join = handle.join();
    tokio::pin!(join);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut printer = UpdatePrinter::default();

    let end = loop {
        tokio::select! {
            end = &mut join => break end?,
            Some(update) = updates.recv() => printer.print(&update),
            Ok(()) = status.changed() => render_status(*status.borrow_and_update()),
            Some(line) = input.recv() => handle_input(&line, &controls, *status.borrow()),
            signal = &mut ctrl_c, if !interrupted => {
                signal.context("listening for Ctrl-C")?;
                interrupted = true;
                controls.stop();
            }
        }
    };

    while let Ok(update) = updates.try_recv() {
        printer.print(&update);
    }

    match end {
        SessionEnd::Completed(session, _) => {
            println!(
                "\n\nWell done. {} for {}, {} cycles.",
                session.technique_name(),
                format_duration(session.duration_secs()),
                session.cycles_completed()
            );
            // Let the closing inhale tone ring out before the process exits.
            if let Some(tone) = closing_tone(settings) {
                tokio::time::sleep(tone.duration()).await;
            }
        }
        SessionEnd::Stopped => println!("\n\nSession stopped. Nothing was recorded."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serene_core::model::PatternDraft;
    use services::{Clock, FeedbackDispatcher, SessionPlan};
    use std::time::Duration;

    fn view(phase: Phase, remaining_ms: u64) -> SessionView {
        SessionView::from_snapshot(&RunSnapshot {
            phase,
            phase_remaining: Duration::from_millis(remaining_ms),
            phase_duration: Duration::from_secs(4),
            cycle_index: 0,
            total_cycles: 3,
            elapsed: Duration::ZERO,
            is_paused: false,
        })
    }

    #[test]
    fn bar_tracks_circle_scale() {
        assert_eq!(breath_bar(&view(Phase::Inhale, 4_000)), ".".repeat(BAR_WIDTH));
        assert_eq!(breath_bar(&view(Phase::HoldAfterInhale, 2_000)), "#".repeat(BAR_WIDTH));
        let half = breath_bar(&view(Phase::Exhale, 2_000));
        assert_eq!(half.matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(half.len(), BAR_WIDTH);
    }

    #[test]
    fn closing_inhale_is_not_announced() {
        let mut printer = UpdatePrinter::default();
        let entered = |phase| SessionUpdate::PhaseEntered {
            phase,
            cycle_index: 0,
            phase_duration: Duration::from_secs(4),
        };
        assert!(printer.line(&entered(Phase::HoldAfterExhale)).is_some());
        let done = printer.line(&SessionUpdate::CycleCompleted {
            cycles_completed: 2,
            total_cycles: 2,
        });
        assert_eq!(done.as_deref(), Some("\n-- cycle 2/2 complete"));
        assert_eq!(printer.line(&entered(Phase::Inhale)), None);
    }

    #[test]
    fn zero_length_phases_are_silent() {
        let mut printer = UpdatePrinter::default();
        let hold = SessionUpdate::PhaseEntered {
            phase: Phase::HoldAfterInhale,
            cycle_index: 0,
            phase_duration: Duration::ZERO,
        };
        assert_eq!(printer.line(&hold), None);
    }

    #[tokio::test]
    async fn typed_commands_drive_the_session() {
        let app = AppServices::in_memory(Clock::system());
        let pattern = PatternDraft::new(4.0, 0.0, 4.0, 0.0, 1).validate().unwrap();
        let handle = app
            .sessions(FeedbackDispatcher::silent())
            .start(SessionPlan::ad_hoc("Test", pattern));
        let controls = handle.controls();

        handle_input("p", &controls, handle.status());
        handle_input("hello", &controls, handle.status());
        handle_input(" q ", &controls, handle.status());
        assert_eq!(handle.join().await.unwrap(), SessionEnd::Stopped);
        assert!(app.history().recent(5).await.unwrap().is_empty());
    }
}
