use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use services::AppServices;

pub async fn export(app: &AppServices, out: Option<PathBuf>) -> Result<()> {
    let json = app.history().export_json().await?;
    let path = out.unwrap_or_else(|| PathBuf::from(app.history().export_file_name()));
    if path == Path::new("-") {
        println!("{json}");
        return Ok(());
    }
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}

pub async fn clear(app: &AppServices, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("this deletes every session and saved pattern; pass --yes to confirm");
    }
    let cleared = app.history().clear_all().await?;
    println!(
        "Removed {} session(s) and {} saved pattern(s). Settings were kept.",
        cleared.sessions, cleared.custom_patterns
    );
    Ok(())
}
