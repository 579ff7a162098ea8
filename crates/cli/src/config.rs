//! CLI configuration loading

use anyhow::Result;
use qroom_http::ClientSettings;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Resolve the data directory: flag, then `QROOM_STATE_DIR`, then the system data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        if let Ok(state_dir) = std::env::var("QROOM_STATE_DIR") {
            PathBuf::from(state_dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("qroom")
        }
    })
}

/// Load client settings from defaults, a config file and `QROOM_*` variables
///
/// An explicit `config_file` must exist; the default `<data_dir>/config.toml`
/// is optional.
pub fn load_settings(config_file: Option<&Path>, data_dir: &Path) -> Result<ClientSettings> {
    let defaults = ClientSettings::default();

    let builder = config::Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("timeout_secs", defaults.timeout_secs)?
        .set_default("user_agent", defaults.user_agent)?
        .set_default("refresh_path", defaults.refresh_path)?;

    let builder = match config_file {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::from(data_dir.join("config.toml")).required(false)),
    };

    let settings = builder
        .add_source(
            config::Environment::with_prefix("QROOM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(None, dir.path()).unwrap();

        assert_eq!(settings.refresh_path, "/auth/refresh");
        assert!(!settings.base_url.is_empty());
    }

    #[test]
    fn test_default_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "timeout_secs = 12\nrefresh_path = \"/token/refresh\"\n",
        )
        .unwrap();

        let settings = load_settings(None, dir.path()).unwrap();
        assert_eq!(settings.timeout_secs, 12);
        assert_eq!(settings.refresh_path, "/token/refresh");
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_settings(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = PathBuf::from("/tmp/qroom-test");
        assert_eq!(resolve_data_dir(Some(dir.clone())), dir);
    }
}
