//! Constants used throughout the application.
//!
//! This module contains all constants used in the Sentio application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "sentio";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Mood journaling with calendar and stability analytics";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the SQLite database path.
pub const ENV_VAR_SENTIO_DB: &str = "SENTIO_DB";
/// Environment variable carrying the authenticated user identifier.
pub const ENV_VAR_SENTIO_USER: &str = "SENTIO_USER";
/// Environment variable overriding the goal reset grace delay, in milliseconds.
pub const ENV_VAR_GOAL_RESET_DELAY_MS: &str = "SENTIO_GOAL_RESET_DELAY_MS";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default database location relative to the user's home directory.
pub const DEFAULT_DB_SUBPATH: &str = "Documents/sentio/sentio.db";

// Validation
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Date/Time Logic
/// Layout records are written with, and the first layout tried when reading.
pub const TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";
/// Comma-less layout accepted as a fallback when reading.
pub const TIMESTAMP_FORMAT_NO_COMMA: &str = "%d %b %Y %H:%M";
/// Calendar-date portion of a record timestamp.
pub const TIMESTAMP_DATE_FORMAT: &str = "%d %b %Y";
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";

// Mood Analytics
/// Label reported as most common when there is nothing to count.
pub const DEFAULT_MOOD_LABEL: &str = "Neutral";
/// Stability points lost per unit of mean affect delta.
pub const STABILITY_PENALTY_PER_STEP: f32 = 15.0;
/// Upper bound of the stability score.
pub const STABILITY_MAX: u8 = 100;

// Weekly Goals
/// Document path of the current goal inside a user partition.
pub const CURRENT_GOAL_PATH: &str = "weeklygoal/current";
/// Smallest allowed weekly target.
pub const MIN_TARGET_DAYS: u32 = 1;
/// Largest allowed weekly target.
pub const MAX_TARGET_DAYS: u32 = 7;
/// Display time before a completed goal is cleared, in milliseconds.
pub const DEFAULT_GOAL_RESET_DELAY_MS: u64 = 3000;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "sentio";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
