use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default dossier data directory: ~/.dossier
pub fn get_dossier_data_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".dossier"))
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))
}

/// Load `~/.dossier/.env` and `./.env` into the process environment.
/// Variables already set are never overwritten.
pub fn load_env_files() {
    if let Ok(dir) = get_dossier_data_dir() {
        let path = dir.join(".env");
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to load env file");
            }
        }
    }
    let _ = dotenvy::dotenv();
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.dossier/config.toml
    let data_dir = get_dossier_data_dir()?;
    let home_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        read_config(&home_config)?
    } else if local_config.exists() {
        read_config(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load an explicit config file; environment overrides still apply.
pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {} failed: {e}", path.display()))?;
    toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse {} failed: {e}", path.display()))
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(v) = env_value("DOSSIER_GENERATION_ENDPOINT") {
        cfg.generation.endpoint = v;
    }
    if let Some(v) = env_value("DOSSIER_MODEL") {
        cfg.generation.model = v;
    }
    if let Some(v) = env_value("DOSSIER_SEARCH_ENDPOINT") {
        cfg.search.endpoint = v;
    }
    if let Some(v) = env_value("DOSSIER_OUTPUT_DIR") {
        cfg.output.directory = v;
    }
    if let Some(v) = env_value("DOSSIER_LANGUAGE") {
        cfg.report.language = v;
    }
    if let Some(v) = env_value("DOSSIER_LOG_LEVEL") {
        cfg.logging.level = v;
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
