mod app;

pub use app::{
    BackendSettings, BusinessSettings, Config, DemoSettings, InvoiceSettings, OutputSettings,
    StoreMode, API_KEY_ENV,
};

use crate::auth::Session;
use crate::error::{AppError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG style, falling back to ~/.isp-ledger/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "isp-ledger") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".isp-ledger"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the output directory; relative paths are taken from the config dir.
pub fn resolve_output_dir(dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Path of the local record store file.
pub fn local_store_file(cfg_dir: &Path) -> PathBuf {
    cfg_dir.join("data.json")
}

fn session_file(cfg_dir: &Path) -> PathBuf {
    cfg_dir.join("session.toml")
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(AppError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(AppError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| AppError::ConfigParse { path, source: e })
}

/// Load the saved session, if any.
pub fn load_session(cfg_dir: &Path) -> Result<Option<Session>> {
    let path = session_file(cfg_dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| AppError::ConfigParse { path, source: e })
}

pub fn save_session(cfg_dir: &Path, session: &Session) -> Result<()> {
    let content = toml::to_string_pretty(session).map_err(|e| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(session_file(cfg_dir), content)?;
    Ok(())
}

pub fn clear_session(cfg_dir: &Path) -> Result<()> {
    let path = session_file(cfg_dir);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[business]
name = "My WiFi Network"
# address = "Jl. Merdeka No. 1"   # optional
# phone = "0812-0000-0000"        # optional
# email = "billing@example.com"   # optional
currency_symbol = "Rp"

[backend]
# "local" keeps records in data.json next to this file.
# "remote" talks to the hosted backend below.
mode = "local"
# url = "https://your-project.supabase.co"
# anon_key = "..."                # or set ISP_LEDGER_ANON_KEY
timeout_secs = 15

[output]
dir = "output"   # relative to this directory, or an absolute / ~/ path

[invoice]
qris_merchant = "WiFi Manager Indonesia"
qris_city = "Jakarta"

[demo]
# Auto sign-in with a shared demo account when no session exists.
# Never enable this on a production deployment.
enabled = false
# email = "demo@example.com"
# password = "..."
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_with_safe_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.backend.mode, StoreMode::Local);
        assert!(!config.demo.enabled);
        assert_eq!(config.business.currency_symbol, "Rp");
    }

    #[test]
    fn relative_output_dir_resolves_under_config_dir() {
        let cfg = Path::new("/tmp/ledger");
        assert_eq!(resolve_output_dir("output", cfg), cfg.join("output"));
        assert_eq!(
            resolve_output_dir("/srv/reports", cfg),
            PathBuf::from("/srv/reports")
        );
    }

    #[test]
    fn session_round_trips_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());

        let session = Session {
            user_id: "u-1".into(),
            email: "owner@example.com".into(),
            access_token: "token".into(),
            refresh_token: None,
            expires_at: Some(10),
        };
        save_session(dir.path(), &session).unwrap();
        assert_eq!(load_session(dir.path()).unwrap(), Some(session));

        clear_session(dir.path()).unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());
    }
}
