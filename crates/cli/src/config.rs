//! CLI file locations

use std::path::PathBuf;

/// Overrides the directory holding the config and the stored session
pub const STATE_DIR_ENV: &str = "LAVACAR_STATE_DIR";

/// Directory for `config.toml` and `credentials.json`
pub fn state_dir() -> PathBuf {
    // Check environment variable first, then fall back to system config dir
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        PathBuf::from(dir)
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lavacar")
    }
}

/// Explicit path, or `config.toml` in the state dir when that file exists
pub fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default = state_dir().join("config.toml");
        default.exists().then_some(default)
    })
}

pub fn credentials_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| state_dir().join("credentials.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let path = PathBuf::from("/tmp/elsewhere.json");
        assert_eq!(credentials_path(Some(path.clone())), path);
        assert_eq!(config_path(Some(path.clone())), Some(path));
    }

    #[test]
    fn credentials_default_to_state_dir() {
        let path = credentials_path(None);
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("credentials.json"));
    }
}
