/// Configuration system for grap.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::GrapConfig::default()`]
/// 2. **User global config** — `~/.grap/config.toml`
/// 3. **Project local config** — `.grap.toml` in the current working directory
/// 4. **Environment variables** — `GRAP_*` overrides (highest precedence)
///
/// File layers are merged key by key, so a project file that only sets
/// `console.audit_window` keeps everything else from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use grap::config;
///
/// let cfg = config::load();
/// grap::web::serve(&cfg.server.addr, &cfg)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::{ClientConfig, ConsoleConfig, GrapConfig, LoggingConfig, ServerConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved grap configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Malformed files are skipped so a bad file never prevents the console
/// from starting.
pub fn load() -> GrapConfig {
    let layers = [
        load_toml_file(global_config_path()),
        load_toml_file(project_config_path()),
    ];
    let mut config = resolve_layers(layers.into_iter().flatten());
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge TOML layers over the defaults, later layers winning per key.
///
/// A layer whose values do not fit the schema (wrong type, out of range) is
/// skipped as a whole; the layers before and after it still apply.
fn resolve_layers(layers: impl IntoIterator<Item = toml::Value>) -> GrapConfig {
    let Ok(mut base) = toml::Value::try_from(GrapConfig::default()) else {
        return GrapConfig::default();
    };
    for layer in layers {
        let mut candidate = base.clone();
        merge_values(&mut candidate, layer);
        if candidate.clone().try_into::<GrapConfig>().is_ok() {
            base = candidate;
        }
    }
    base.try_into().unwrap_or_default()
}

/// Load a TOML file as an untyped value tree (if it exists and parses).
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively merge `overlay` into `base`. Tables merge; any other value
/// replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.grap/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    grap_home().map(|dir| dir.join("config.toml"))
}

/// Path to the project local config: `.grap.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".grap.toml"))
}

/// The per-user data directory, `~/.grap`.
pub fn grap_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".grap"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `GRAP_ADDR` — server listen address
/// - `GRAP_OPEN_BROWSER` — open the browser on `grap serve` (`1`/`true`/`yes`/`on`)
/// - `GRAP_URL` — console base URL for client commands
/// - `GRAP_TIMEOUT_MS` — client request timeout
/// - `GRAP_AUDIT_WINDOW` — audit table rows
/// - `GRAP_EVENT_LOG` — enable the JSONL event log
/// - `GRAP_ACCESS_LOG` — enable the request access log
///
/// `lookup` abstracts `std::env::var` so tests do not mutate the process
/// environment.
fn apply_env_overrides(config: &mut GrapConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("GRAP_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Some(val) = lookup("GRAP_OPEN_BROWSER") {
        config.server.open_browser = is_truthy(&val);
    }
    if let Some(val) = lookup("GRAP_URL")
        && !val.is_empty()
    {
        config.client.base_url = val;
    }
    if let Some(val) = lookup("GRAP_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.client.timeout_ms = ms;
    }
    if let Some(val) = lookup("GRAP_AUDIT_WINDOW")
        && let Ok(rows) = val.parse::<usize>()
        && rows > 0
    {
        config.console.audit_window = rows;
    }
    if let Some(val) = lookup("GRAP_EVENT_LOG") {
        config.logging.event_log = is_truthy(&val);
    }
    if let Some(val) = lookup("GRAP_ACCESS_LOG") {
        config.logging.access_log = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.grap/config.toml`.
///
/// Creates the `~/.grap/` directory if it doesn't exist. Returns an error if
/// the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.grap/ directory")?;
    }

    fs::write(&path, GrapConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or the serialized defaults), updates the
/// dotted key (e.g. `console.audit_window`), and writes the result back.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(GrapConfig::default())
            .context("failed to serialize default config")?
    };

    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value is parsed according to the type of the existing value.
/// A key missing from the file is accepted when the schema defines it.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let (section, leaf) = key
        .split_once('.')
        .with_context(|| format!("config key must be 'section.key', got '{key}'"))?;

    let defaults = toml::Value::try_from(GrapConfig::default())
        .context("failed to serialize default config")?;
    let known = defaults.get(section).and_then(|s| s.get(leaf)).cloned();

    let root_table = root
        .as_table_mut()
        .context("expected a table at the config root")?;
    let table = root_table
        .entry(section.to_string())
        .or_insert(toml::Value::Table(toml::map::Map::new()))
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let existing = table.get(leaf).cloned().or(known);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    // The value alone must fit the schema (e.g. no negative ids).
    let mut check = defaults;
    merge_values(
        &mut check,
        toml::Value::Table(toml::map::Map::from_iter([(
            section.to_string(),
            toml::Value::Table(toml::map::Map::from_iter([(
                leaf.to_string(),
                new_value.clone(),
            )])),
        )])),
    );
    if let Err(e) = check.try_into::<GrapConfig>() {
        anyhow::bail!("invalid value '{raw_value}' for '{key}': {}", e.message());
    }

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_layers_yield_defaults() {
        let config = resolve_layers(Vec::new());
        assert_eq!(config.server.addr, "127.0.0.1:9750");
        assert_eq!(config.console.audit_window, 12);
    }

    #[test]
    fn project_layer_overrides_only_its_keys() {
        let global: toml::Value = toml::from_str(
            r#"
[server]
addr = "0.0.0.0:8000"
[console]
default_hold_reason = "Subpoena"
"#,
        )
        .unwrap();
        let project: toml::Value = toml::from_str(
            r#"
[console]
audit_window = 4
"#,
        )
        .unwrap();

        let config = resolve_layers([global, project]);
        assert_eq!(config.server.addr, "0.0.0.0:8000");
        assert_eq!(config.console.default_hold_reason, "Subpoena");
        assert_eq!(config.console.audit_window, 4);
        assert_eq!(config.console.default_user_id, 1);
    }

    #[test]
    fn ill_typed_layer_falls_back_to_defaults() {
        let bad: toml::Value = toml::from_str("[console]\naudit_window = \"many\"\n").unwrap();
        let config = resolve_layers([bad]);
        assert_eq!(config.console.audit_window, 12);
    }

    #[test]
    fn bad_layer_does_not_discard_good_layers() {
        let global: toml::Value = toml::from_str("[server]\naddr = \"0.0.0.0:8000\"\n").unwrap();
        let project: toml::Value =
            toml::from_str("[console]\ndefault_user_id = -1\naudit_window = 4\n").unwrap();
        let later: toml::Value = toml::from_str("[client]\ntimeout_ms = 500\n").unwrap();

        let config = resolve_layers([global, project, later]);
        assert_eq!(config.server.addr, "0.0.0.0:8000");
        assert_eq!(config.console.default_user_id, 1);
        assert_eq!(config.console.audit_window, 12);
        assert_eq!(config.client.timeout_ms, 500);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = GrapConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("GRAP_ADDR", "127.0.0.1:1"),
                ("GRAP_OPEN_BROWSER", "0"),
                ("GRAP_URL", "http://console.local"),
                ("GRAP_TIMEOUT_MS", "250"),
                ("GRAP_AUDIT_WINDOW", "3"),
                ("GRAP_EVENT_LOG", "off"),
            ]),
        );
        assert_eq!(config.server.addr, "127.0.0.1:1");
        assert!(!config.server.open_browser);
        assert_eq!(config.client.base_url, "http://console.local");
        assert_eq!(config.client.timeout_ms, 250);
        assert_eq!(config.console.audit_window, 3);
        assert!(!config.logging.event_log);
        assert!(config.logging.access_log);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = GrapConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("GRAP_ADDR", ""),
                ("GRAP_TIMEOUT_MS", "soon"),
                ("GRAP_AUDIT_WINDOW", "0"),
            ]),
        );
        assert_eq!(config.server.addr, "127.0.0.1:9750");
        assert_eq!(config.client.timeout_ms, 10_000);
        assert_eq!(config.console.audit_window, 12);
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", "ON"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn set_toml_value_updates_typed_values() {
        let mut root: toml::Value = toml::from_str(
            r#"
[console]
audit_window = 12
[logging]
event_log = true
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "console.audit_window", "20").unwrap();
        set_toml_value(&mut root, "logging.event_log", "no").unwrap();
        assert_eq!(root["console"]["audit_window"].as_integer(), Some(20));
        assert_eq!(root["logging"]["event_log"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_adds_known_key_missing_from_file() {
        let mut root: toml::Value = toml::from_str("[server]\n").unwrap();
        set_toml_value(&mut root, "console.default_hold_reason", "Audit").unwrap();
        set_toml_value(&mut root, "server.open_browser", "false").unwrap();
        assert_eq!(
            root["console"]["default_hold_reason"].as_str(),
            Some("Audit")
        );
        assert_eq!(root["server"]["open_browser"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str("[console]\naudit_window = 12\n").unwrap();
        assert!(set_toml_value(&mut root, "console.audit_window", "lots").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "toplevel", "value").is_err());
    }

    #[test]
    fn set_toml_value_rejects_out_of_range_integers() {
        let mut root: toml::Value = toml::from_str("[console]\ndefault_user_id = 1\n").unwrap();
        assert!(set_toml_value(&mut root, "console.default_user_id", "-5").is_err());
        assert!(set_toml_value(&mut root, "client.timeout_ms", "-1").is_err());
        assert!(set_toml_value(&mut root, "console.default_user_id", "5000000000").is_err());
        assert_eq!(root["console"]["default_user_id"].as_integer(), Some(1));

        set_toml_value(&mut root, "console.default_user_id", "7").unwrap();
        assert_eq!(root["console"]["default_user_id"].as_integer(), Some(7));
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: GrapConfig = toml::from_str(&toml_str).unwrap();
    }
}
