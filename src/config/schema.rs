/// Configuration schema and defaults for the grap console.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[server]`, `[client]`, `[console]`, and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values they
/// want to override.
use serde::{Deserialize, Serialize};

use crate::audit;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level grap configuration.
///
/// Maps directly to the `~/.grap/config.toml` and `.grap.toml` file schemas.
/// All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrapConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub console: ConsoleConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Embedded console server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `grap serve`.
    pub addr: String,
    /// Open the console in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9750".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [client]
// ---------------------------------------------------------------------------

/// Settings for CLI commands that talk to a running console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the console API.
    pub base_url: String,
    /// Request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9750".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [console]
// ---------------------------------------------------------------------------

/// Behavior of the simulated console handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Number of audit entries rendered into the audit table.
    pub audit_window: usize,
    /// User id used when a user id field is left blank.
    pub default_user_id: u32,
    /// Reason used when the legal hold reason field is left blank.
    pub default_hold_reason: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            audit_window: audit::DEFAULT_WINDOW,
            default_user_id: 1,
            default_hold_reason: "Court Order".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every recorded console action to `~/.grap/events.jsonl`.
    pub event_log: bool,
    /// Print one line per handled request.
    pub access_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            event_log: true,
            access_log: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl GrapConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `grap config init`.
    pub fn default_toml() -> String {
        r#"# grap Configuration
# Compliance console: simulated user shadowing, crypto-erase, legal holds
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (GRAP_*)
#   2. Project config (.grap.toml in current directory)
#   3. User global config (~/.grap/config.toml)
#   4. Built-in defaults

[server]
addr = "127.0.0.1:9750"
open_browser = true                  # Or GRAP_OPEN_BROWSER=0

[client]
base_url = "http://127.0.0.1:9750"   # Console used by `grap ping|act|audit`
timeout_ms = 10000

[console]
audit_window = 12                    # Rows shown in the audit table
default_user_id = 1                  # Used when a user id field is blank
default_hold_reason = "Court Order"   # Used when the hold reason is blank

[logging]
event_log = true                     # Append actions to ~/.grap/events.jsonl
access_log = true                    # Print one line per request
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_console_behavior() {
        let cfg = GrapConfig::default();
        assert_eq!(cfg.console.audit_window, 12);
        assert_eq!(cfg.console.default_user_id, 1);
        assert_eq!(cfg.console.default_hold_reason, "Court Order");
        assert_eq!(cfg.server.addr, "127.0.0.1:9750");
        assert!(cfg.logging.event_log);
    }

    #[test]
    fn default_toml_parses_to_defaults() {
        let parsed: GrapConfig = toml::from_str(&GrapConfig::default_toml()).unwrap();
        let defaults = GrapConfig::default();
        assert_eq!(parsed.server.addr, defaults.server.addr);
        assert_eq!(parsed.client.base_url, defaults.client.base_url);
        assert_eq!(parsed.client.timeout_ms, defaults.client.timeout_ms);
        assert_eq!(parsed.console.audit_window, defaults.console.audit_window);
        assert_eq!(
            parsed.console.default_hold_reason,
            defaults.console.default_hold_reason
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: GrapConfig = toml::from_str(
            r#"
[console]
audit_window = 5
"#,
        )
        .unwrap();
        assert_eq!(parsed.console.audit_window, 5);
        assert_eq!(parsed.console.default_user_id, 1);
        assert_eq!(parsed.server.addr, "127.0.0.1:9750");
    }
}
