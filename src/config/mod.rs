//! Configuration management for the sentio application.
//!
//! Settings come from environment variables with sensible defaults; the CLI
//! may override the database path and user afterwards.
//!
//! # Environment Variables
//!
//! - `SENTIO_DB`: Path to the SQLite database (defaults to ~/Documents/sentio/sentio.db)
//! - `SENTIO_USER`: Authenticated user id; unset or blank means nobody is signed in
//! - `SENTIO_GOAL_RESET_DELAY_MS`: Grace delay before a completed goal is cleared
//! - `HOME`: Used for expanding the default database path

use crate::constants::{
    DEFAULT_DB_SUBPATH, DEFAULT_GOAL_RESET_DELAY_MS, ENV_VAR_GOAL_RESET_DELAY_MS, ENV_VAR_HOME,
    ENV_VAR_SENTIO_DB, ENV_VAR_SENTIO_USER, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::repository::UserId;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the sentio application.
///
/// # Examples
///
/// ```
/// use sentio::Config;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = Config {
///     db_path: PathBuf::from("/data/sentio.db"),
///     user_id: Some("user-1".to_string()),
///     goal_reset_delay: Duration::from_secs(3),
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.owner().unwrap().as_str(), "user-1");
/// ```
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Signed-in user, if any.
    pub user_id: Option<String>,

    /// How long a completed goal stays visible before it is cleared.
    pub goal_reset_delay: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &REDACTED_PLACEHOLDER)
            .field(
                "user_id",
                &self.user_id.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("goal_reset_delay", &self.goal_reset_delay)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::new(),
            user_id: None,
            goal_reset_delay: Duration::from_millis(DEFAULT_GOAL_RESET_DELAY_MS),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// The database path is expanded with `shellexpand`, so `~` and `$VAR`
    /// references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The database path expansion fails or yields an empty path
    /// - `SENTIO_GOAL_RESET_DELAY_MS` is not a non-negative integer
    pub fn load() -> AppResult<Self> {
        let db_path_str = env::var(ENV_VAR_SENTIO_DB).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DB_SUBPATH)
        });
        let db_path = expand_path(&db_path_str)?;

        let user_id = env::var(ENV_VAR_SENTIO_USER)
            .ok()
            .filter(|id| !id.trim().is_empty());

        let goal_reset_delay = match env::var(ENV_VAR_GOAL_RESET_DELAY_MS) {
            Ok(raw) => {
                let millis = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::Config(format!(
                        "{} must be a whole number of milliseconds, got '{}'",
                        ENV_VAR_GOAL_RESET_DELAY_MS, raw
                    ))
                })?;
                Duration::from_millis(millis)
            }
            Err(_) => Duration::from_millis(DEFAULT_GOAL_RESET_DELAY_MS),
        };

        Ok(Config {
            db_path,
            user_id,
            goal_reset_delay,
        })
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, db: Option<&str>, user: Option<&str>) -> AppResult<Self> {
        if let Some(db) = db {
            self.db_path = expand_path(db)?;
        }
        if let Some(user) = user {
            self.user_id = Some(user.to_string()).filter(|id| !id.trim().is_empty());
        }
        Ok(self)
    }

    /// The signed-in user, or `None` when record and goal operations should no-op.
    pub fn owner(&self) -> Option<UserId> {
        self.user_id.as_deref().and_then(UserId::new)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the database path is empty or relative.
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if !self.db_path.is_absolute() {
            return Err(AppError::Config(
                "Database path must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    let path = PathBuf::from(expanded.into_owned());
    if path.as_os_str().is_empty() {
        return Err(AppError::Config("Database path is empty".to_string()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(ENV_VAR_SENTIO_DB);
        env::remove_var(ENV_VAR_SENTIO_USER);
        env::remove_var(ENV_VAR_GOAL_RESET_DELAY_MS);
    }

    #[test]
    fn test_debug_impl_redacts_sensitive_info() {
        let config = Config {
            db_path: PathBuf::from("/home/someone/private/sentio.db"),
            user_id: Some("someone@example.com".to_string()),
            goal_reset_delay: Duration::from_secs(3),
        };

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("/home/someone"));
        assert!(!debug_output.contains("someone@example.com"));
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();
        let original_home = env::var(ENV_VAR_HOME).ok();
        env::set_var(ENV_VAR_HOME, "/home/tester");

        let config = Config::load().unwrap();

        if let Some(home) = original_home {
            env::set_var(ENV_VAR_HOME, home);
        }

        assert_eq!(
            config.db_path,
            PathBuf::from("/home/tester/Documents/sentio/sentio.db")
        );
        assert_eq!(config.user_id, None);
        assert_eq!(config.goal_reset_delay, Duration::from_millis(3000));
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        clear_env();
        env::set_var(ENV_VAR_SENTIO_DB, "/tmp/custom.db");
        env::set_var(ENV_VAR_SENTIO_USER, "user-9");
        env::set_var(ENV_VAR_GOAL_RESET_DELAY_MS, "250");

        let config = Config::load().unwrap();
        clear_env();

        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.owner().unwrap().as_str(), "user-9");
        assert_eq!(config.goal_reset_delay, Duration::from_millis(250));
    }

    #[test]
    #[serial]
    fn test_blank_user_means_no_owner() {
        clear_env();
        env::set_var(ENV_VAR_SENTIO_USER, "   ");

        let config = Config::load().unwrap();
        clear_env();

        assert!(config.owner().is_none());
    }

    #[test]
    #[serial]
    fn test_bad_delay_is_rejected() {
        clear_env();
        env::set_var(ENV_VAR_GOAL_RESET_DELAY_MS, "soon");

        let result = Config::load();
        clear_env();

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_win() {
        let config = Config {
            db_path: PathBuf::from("/a.db"),
            user_id: Some("env-user".to_string()),
            ..Config::default()
        }
        .with_overrides(Some("/b.db"), Some("cli-user"))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/b.db"));
        assert_eq!(config.user_id.as_deref(), Some("cli-user"));
    }

    #[test]
    fn test_validate_requires_absolute_path() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.db_path = PathBuf::from("relative/sentio.db");
        assert!(config.validate().is_err());

        config.db_path = PathBuf::from("/abs/sentio.db");
        assert!(config.validate().is_ok());
    }
}
