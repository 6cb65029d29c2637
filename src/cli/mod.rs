//! CLI command implementations for grap.
//!
//! Provides subcommand handlers for:
//! - `grap ping` — check that a console is answering
//! - `grap health` — config files, event log, console reachability
//! - `grap act <action>` — run a console action on a running console
//! - `grap audit` — list recent audit entries (console or local event log)
//! - `grap config show|init|set|reset` — configuration management

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

use crate::audit::{self, AuditEntry};
use crate::config::{self, GrapConfig};
use crate::console::{Action, ActionInput};
use crate::events;
use crate::http::{ApiClient, ApiError};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Client for the console at `url`, or the configured base URL.
fn client(cfg: &GrapConfig, url: Option<&str>) -> ApiClient {
    match url {
        Some(url) => {
            let mut client_cfg = cfg.client.clone();
            client_cfg.base_url = url.to_string();
            ApiClient::from_config(&client_cfg)
        }
        None => ApiClient::from_config(&cfg.client),
    }
}

/// Unwrap the `data` member of a console API envelope.
fn envelope_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

/// Describe an API error, including the attached response payload.
fn describe_error(err: &ApiError) -> String {
    match err.payload() {
        Some(payload) => {
            let reason = payload
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| payload.to_string());
            let details = payload
                .get("details")
                .and_then(Value::as_str)
                .map(|d| format!(" ({d})"))
                .unwrap_or_default();
            format!("{err}: {reason}{details}")
        }
        None => err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// grap ping
// ---------------------------------------------------------------------------

/// Call `GET /api/ping` on the console.
pub fn run_ping(url: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let client = client(&cfg, url);

    match client.get("/api/ping") {
        Ok(value) => {
            let data = envelope_data(value);
            println!(
                "{} {} answered {}",
                "✓".green().bold(),
                client.base_url(),
                data.as_str().unwrap_or("ok")
            );
            Ok(())
        }
        Err(e) => anyhow::bail!("{}", describe_error(&e)),
    }
}

// ---------------------------------------------------------------------------
// grap health
// ---------------------------------------------------------------------------

/// Check config files, the local event log, and console reachability.
pub fn run_health() -> Result<()> {
    println!("{}", "grap Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.grap/config.toml found"
        } else {
            "not found (run `grap config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".grap.toml found"
        } else {
            "none (optional)"
        },
    );

    let log_path = events::events_log_path();
    let log_entries = log_path
        .as_deref()
        .filter(|p| p.exists())
        .map(|p| events::read_entries(p).len());
    print_health_item(
        "Event log",
        log_entries.is_some() || !cfg.logging.event_log,
        &match (cfg.logging.event_log, log_entries) {
            (false, _) => "disabled".to_string(),
            (true, Some(n)) => format!("{n} entries"),
            (true, None) => "no log file yet".to_string(),
        },
    );

    let client = client(&cfg, None);
    match client.get("/api/ping") {
        Ok(_) => print_health_item(
            "Console",
            true,
            &format!("reachable at {}", client.base_url()),
        ),
        Err(e) => print_health_item(
            "Console",
            false,
            &format!("{} ({})", client.base_url(), describe_error(&e)),
        ),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// grap act
// ---------------------------------------------------------------------------

/// Run `action` on the console and print the panels it changed.
pub fn run_act(action: Action, input: &ActionInput, url: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let client = client(&cfg, url);

    let path = format!("/api/actions/{}", action.name());
    let data = match client.post(&path, input) {
        Ok(value) => envelope_data(value),
        Err(e) => anyhow::bail!("{} failed: {}", action, describe_error(&e)),
    };

    println!("{} {}", "✓".green().bold(), action.to_string().bold());

    if let Some(panels) = data.get("panels").and_then(Value::as_object) {
        for (id, text) in panels {
            let Some(text) = text.as_str().filter(|t| !t.is_empty()) else {
                continue;
            };
            println!();
            println!("{}", id.cyan().bold());
            println!("{text}");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// grap audit
// ---------------------------------------------------------------------------

/// List recent audit entries from the console, or from the local event log
/// when `local` is set.
pub fn run_audit(
    limit: usize,
    format: OutputFormat,
    url: Option<&str>,
    local: bool,
) -> Result<()> {
    let limit = audit::clamp_limit(limit);

    let entries = if local {
        let path = events::events_log_path().context("could not determine home directory")?;
        let mut entries = events::read_entries(&path);
        entries.truncate(limit);
        entries
    } else {
        let cfg = config::load();
        let client = client(&cfg, url);
        let data = client
            .get(&format!("/api/audit?limit={limit}"))
            .map(envelope_data)
            .map_err(|e| anyhow::anyhow!("{}", describe_error(&e)))?;
        serde_json::from_value::<Vec<AuditEntry>>(data.get("rows").cloned().unwrap_or_default())
            .context("unexpected audit response")?
    };

    if entries.is_empty() {
        println!("{}", "No audit entries yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => print_audit_csv(&entries),
        OutputFormat::Table => print_audit_table(&entries),
    }

    Ok(())
}

fn print_audit_table(entries: &[AuditEntry]) {
    println!("{}", "grap Audit Log".bold().cyan());
    println!("{}", "=".repeat(90));
    println!(
        "  {:<24} {:<16} {:>6}  Detail",
        "Time", "Action", "User"
    );
    println!("  {}", "-".repeat(88));

    for (i, e) in entries.iter().enumerate() {
        let line = format!(
            "  {:<24} {:<16} {:>6}  {}",
            e.timestamp,
            e.action.as_str(),
            e.user_label(),
            e.detail
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_audit_csv(entries: &[AuditEntry]) {
    println!("timestamp,action,user_id,detail");
    for e in entries {
        println!(
            "{},{},{},{}",
            e.timestamp,
            e.action,
            e.user_id.map(|id| id.to_string()).unwrap_or_default(),
            csv_field(&e.detail)
        );
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// grap config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective grap Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.grap/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.grap/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".grap.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".grap.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "GRAP_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.grap/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
