use anyhow::Result;
use serene_core::stats::{format_duration, relative_day};
use services::AppServices;

pub async fn summary(app: &AppServices) -> Result<()> {
    let stats = app.history().progress().await?;
    let today = app.clock().today();

    println!("Sessions:    {}", stats.total_sessions);
    println!("Total time:  {}", format_duration(stats.total_time_secs));
    println!("Streak:      {} day(s)", stats.streak_days);

    if !stats.achievements.is_empty() {
        println!("\nAchievements:");
        for achievement in &stats.achievements {
            println!("  * {}: {}", achievement.title(), achievement.description());
        }
    }

    if stats.recent.is_empty() {
        println!("\nNo sessions yet. Start one with `sereneflow run box-breathing`.");
        return Ok(());
    }
    println!("\nRecent:");
    for session in &stats.recent {
        println!(
            "  {:<28} {:>8}  {}",
            session.technique_name(),
            format_duration(session.duration_secs()),
            relative_day(session.completed_on(), today)
        );
    }
    Ok(())
}

pub async fn history(app: &AppServices, limit: u32) -> Result<()> {
    let rows = app.history().recent(limit).await?;
    if rows.is_empty() {
        println!("No sessions recorded.");
        return Ok(());
    }
    let total = app.history().count().await?;
    println!("Showing {} of {total} session(s)", rows.len());
    for row in &rows {
        println!(
            "#{:<5} {}  {:<28} {:>8}  {} cycles",
            row.id,
            row.session.completed_at().format("%Y-%m-%d %H:%M"),
            row.session.technique_name(),
            format_duration(row.session.duration_secs()),
            row.session.cycles_completed()
        );
    }
    Ok(())
}
