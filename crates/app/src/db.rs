use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const MEMORY_URL: &str = "sqlite::memory:";

fn is_in_memory(db_url: &str) -> bool {
    db_url == MEMORY_URL || db_url.contains("mode=memory")
}

/// Turn a bare or relative path into an absolute `sqlite://` URL.
///
/// In-memory URLs and URLs already using `sqlite://` or `sqlite:file:` pass through.
pub fn normalize_sqlite_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("invalid --db value: {raw:?}");
    }
    if is_in_memory(trimmed) || trimmed.starts_with("sqlite://") || trimmed.starts_with("sqlite:file:")
    {
        return Ok(trimmed.to_owned());
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    Ok(format!("sqlite://{}", absolute.display()))
}

/// Make sure the database file and its parent directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if is_in_memory(db_url) || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_and_full_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:").unwrap(), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/flow.db").unwrap(),
            "sqlite:///tmp/flow.db"
        );
        assert!(normalize_sqlite_url("  ").is_err());
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/flow.sqlite3").unwrap();
        let path = url.strip_prefix("sqlite://").unwrap();
        assert!(Path::new(path).is_absolute());
        assert!(path.ends_with("data/flow.sqlite3"));
    }

    #[test]
    fn prepare_skips_memory_and_rejects_foreign_schemes() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = std::env::temp_dir().join(format!("sereneflow-db-{}", std::process::id()));
        let file = dir.join("nested").join("flow.sqlite3");
        prepare_sqlite_file(&format!("sqlite://{}?mode=rwc", file.display())).unwrap();
        assert!(file.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
