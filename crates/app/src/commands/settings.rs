use std::sync::Arc;

use anyhow::Result;
use serene_core::feedback::ToneSpec;
use serene_core::model::{FeedbackSettings, Phase};
use services::{AppServices, FeedbackDispatcher};

use crate::cli::SettingsUpdate;
use crate::devices::{TerminalVibrator, tone_player};

fn print_settings(settings: &FeedbackSettings) {
    let pattern = settings.haptic_pattern();
    let sound = settings.sound_type().profile();
    println!("Haptics:        {}", on_off(settings.haptic_enabled()));
    println!("Haptic pattern: {} ({}): {}", pattern.name(), pattern.key(), pattern.description());
    println!("Sound:          {}", on_off(settings.sound_enabled()));
    println!(
        "Sound type:     {} ({}): {}",
        sound.name,
        settings.sound_type().key(),
        sound.description
    );
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

async fn terminal_feedback(app: &AppServices) -> Result<FeedbackDispatcher> {
    Ok(app.feedback(Arc::new(TerminalVibrator), tone_player()).await?)
}

pub async fn show(app: &AppServices) -> Result<()> {
    print_settings(&app.settings().load().await?);
    Ok(())
}

pub async fn set(app: &AppServices, update: SettingsUpdate) -> Result<()> {
    if update.is_empty() {
        println!("Nothing to change.");
        return show(app).await;
    }
    let settings = app.settings().update(update.into_draft()).await?;
    print_settings(&settings);
    Ok(())
}

pub async fn test_haptic(app: &AppServices) -> Result<()> {
    let feedback = terminal_feedback(app).await?;
    if !feedback.settings().haptics_active() {
        println!("Haptics are off.");
        return Ok(());
    }
    feedback.test_haptic();
    println!("Played the {} pattern.", feedback.settings().haptic_pattern().name());
    Ok(())
}

pub async fn preview_sound(app: &AppServices) -> Result<()> {
    let feedback = terminal_feedback(app).await?;
    if !feedback.settings().sound_active() {
        println!("Sound is off.");
        return Ok(());
    }
    feedback.preview_sound();
    println!("Playing the {} inhale tone.", feedback.settings().sound_type().profile().name);
    // Playback is fire-and-forget; keep the process alive until the tone has finished.
    if let Some(tone) = ToneSpec::for_phase(feedback.settings().sound_type(), Phase::Inhale) {
        tokio::time::sleep(tone.duration()).await;
    }
    Ok(())
}
