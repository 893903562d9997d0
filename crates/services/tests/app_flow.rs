use std::time::Duration;

use serene_core::catalog::TimingOverrides;
use serene_core::model::{FeedbackSettingsDraft, PatternDraft};
use serene_core::time::fixed_now;
use services::{AppServices, Clock, FeedbackDispatcher, PlanOverrides, SessionEnd};

#[tokio::test]
async fn sqlite_backed_practice_flow() {
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_app_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
    )
    .await
    .expect("sqlite services")
    .with_tick(Duration::from_millis(10));

    let settings = app
        .settings()
        .update(FeedbackSettingsDraft {
            haptic_pattern: Some("progressive".into()),
            sound_enabled: Some(true),
            ..FeedbackSettingsDraft::default()
        })
        .await
        .unwrap();
    assert!(settings.sound_active());

    app.library()
        .save_custom("Quick", PatternDraft::new(0.05, 0.0, 0.05, 0.0, 2))
        .await
        .unwrap();
    let plan = app
        .library()
        .plan(
            "Quick",
            PlanOverrides {
                cycles: Some(1),
                timings: TimingOverrides {
                    hold_after_inhale: Some(0.02),
                    ..TimingOverrides::default()
                },
            },
        )
        .await
        .unwrap();
    assert_eq!(plan.pattern.notation(), "0.05-0.02-0.05-0");

    let feedback = FeedbackDispatcher::silent().with_settings(settings);
    let end = app.sessions(feedback).start(plan).join().await.unwrap();
    assert!(matches!(end, SessionEnd::Completed(_, _)));

    let stats = app.history().progress().await.unwrap();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.recent[0].technique_name(), "Quick");

    let export: serde_json::Value =
        serde_json::from_str(&app.history().export_json().await.unwrap()).unwrap();
    assert_eq!(export["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(export["custom_patterns"][0]["name"], "Quick");

    let cleared = app.history().clear_all().await.unwrap();
    assert_eq!(cleared.sessions, 1);
    assert_eq!(cleared.custom_patterns, 1);
    assert!(app.library().list_custom().await.unwrap().is_empty());

    // Settings survive a data wipe.
    assert_eq!(app.settings().load().await.unwrap(), settings);
}
