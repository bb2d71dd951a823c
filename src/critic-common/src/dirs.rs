//! Application directories for Critic.
//!
//! Everything lives under a single home directory:
//! - Linux/macOS: `~/.critic`
//! - Windows: `%APPDATA%\critic`
//!
//! Can be overridden with the `CRITIC_HOME` environment variable.

use std::path::PathBuf;

/// Application name for directory paths
pub const APP_NAME: &str = "critic";

/// Primary home directory name on Linux/macOS
pub const HOME_DIR_NAME: &str = ".critic";

/// Environment variable overriding the home directory
pub const CRITIC_HOME_ENV: &str = "CRITIC_HOME";

/// File holding the persisted upload history
pub const HISTORY_FILE: &str = "history.json";

/// Application directories structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Root directory (config, history)
    pub home: PathBuf,
    /// Log directory (`<home>/logs`)
    pub logs_dir: PathBuf,
}

impl AppDirs {
    /// Get application directories, respecting `CRITIC_HOME`.
    ///
    /// Relative overrides are resolved against the current directory so the
    /// history file never ends up somewhere surprising.
    pub fn new() -> Option<Self> {
        if let Ok(home) = std::env::var(CRITIC_HOME_ENV)
            && !home.is_empty()
        {
            let home = PathBuf::from(home);
            let home = if home.is_relative() {
                std::env::current_dir().ok()?.join(home)
            } else {
                home
            };
            return Some(Self::at(home));
        }

        #[cfg(target_os = "windows")]
        let home = dirs::config_dir()?.join(APP_NAME);

        #[cfg(not(target_os = "windows"))]
        let home = dirs::home_dir()?.join(HOME_DIR_NAME);

        Some(Self::at(home))
    }

    /// Build the directory layout rooted at `home`.
    pub fn at(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            logs_dir: home.join("logs"),
            home,
        }
    }

    /// Get the primary config file path (config.toml)
    pub fn config_file(&self) -> PathBuf {
        self.home.join(crate::config::CONFIG_FILE)
    }

    /// Get the upload history file path
    pub fn history_file(&self) -> PathBuf {
        self.home.join(HISTORY_FILE)
    }

    /// Ensure all directories exist
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.home, &self.logs_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
                }
            }
        }
        Ok(())
    }
}

/// Get application directories (convenience function)
pub fn get_app_dirs() -> Option<AppDirs> {
    AppDirs::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_layout_under_home() {
        let dirs = AppDirs::at("/tmp/critic-test");
        assert_eq!(dirs.config_file(), PathBuf::from("/tmp/critic-test/config.toml"));
        assert_eq!(dirs.history_file(), PathBuf::from("/tmp/critic-test/history.json"));
        assert_eq!(dirs.logs_dir, PathBuf::from("/tmp/critic-test/logs"));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        let test_path = std::env::temp_dir().join("test-critic");
        // SAFETY: serialized with the other env-mutating tests
        unsafe {
            std::env::set_var(CRITIC_HOME_ENV, &test_path);
        }
        let dirs = AppDirs::new().unwrap();
        assert_eq!(dirs.home, test_path);
        unsafe {
            std::env::remove_var(CRITIC_HOME_ENV);
        }
    }

    #[test]
    fn test_ensure_dirs_creates_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = AppDirs::at(tmp.path().join("nested"));
        dirs.ensure_dirs().unwrap();
        assert!(dirs.home.is_dir());
        assert!(dirs.logs_dir.is_dir());
    }
}
