use anyhow::{Result, bail};
use serene_core::model::PatternDraft;
use services::AppServices;

pub async fn save(app: &AppServices, name: &str, draft: PatternDraft) -> Result<()> {
    let custom = app.library().save_custom(name, draft).await?;
    println!(
        "Saved \"{}\": {} x {} cycles",
        custom.name(),
        custom.pattern().notation(),
        custom.pattern().total_cycles()
    );
    Ok(())
}

pub async fn list(app: &AppServices) -> Result<()> {
    let patterns = app.library().list_custom().await?;
    if patterns.is_empty() {
        println!("No saved patterns. Create one with `sereneflow custom save`.");
        return Ok(());
    }
    for custom in &patterns {
        println!(
            "{:<24} {:<16} {:>3} cycles  saved {}",
            custom.name(),
            custom.pattern().notation(),
            custom.pattern().total_cycles(),
            custom.created_at().format("%Y-%m-%d")
        );
    }
    Ok(())
}

pub async fn delete(app: &AppServices, name: &str) -> Result<()> {
    if !app.library().delete_custom(name).await? {
        bail!("no saved pattern named {name:?}");
    }
    println!("Deleted \"{}\"", name.trim());
    Ok(())
}
