use anyhow::Result;
use clap::{Parser, Subcommand};

use grap::console::{Action, ActionInput, RawUserId};
use grap::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "grap")]
#[command(about = "Data-compliance console: users, keys, legal holds, backups")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Launch the web console
    Serve {
        /// Address to bind (default from config: 127.0.0.1:9750)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open the browser automatically
        #[arg(long)]
        no_open: bool,
    },
    /// Check that a console is answering
    Ping {
        /// Console base URL (default from config)
        #[arg(long)]
        url: Option<String>,
    },
    /// Check system health: config files, event log, console reachability
    Health,
    /// Run a console action, e.g. `grap act destroy-keys --user-id 3`
    Act {
        /// Action name: create-user, destroy-keys, restore-sim, add-hold,
        /// release-hold, protect-backups, lookup-backups, refresh-user,
        /// refresh-keys, load-metrics
        action: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Console base URL (default from config)
        #[arg(long)]
        url: Option<String>,
    },
    /// Show recent audit entries
    Audit {
        /// Maximum number of entries (1-500)
        #[arg(long, default_value = "50")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Read the local event log instead of a running console
        #[arg(long)]
        local: bool,
        /// Console base URL (default from config)
        #[arg(long)]
        url: Option<String>,
    },
    /// Manage grap configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective (merged) configuration
    Show,
    /// Create a default config file at ~/.grap/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a config value, e.g. `grap config set console.audit_window 20`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr, no_open } => {
            let mut cfg = config::load();
            if no_open {
                cfg.server.open_browser = false;
            }
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            web::serve(&addr, &cfg)
        }
        Commands::Ping { url } => cli::run_ping(url.as_deref()),
        Commands::Health => cli::run_health(),
        Commands::Act {
            action,
            user_id,
            reason,
            full_name,
            email,
            phone,
            url,
        } => {
            let action: Action = action.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let input = ActionInput {
                full_name: full_name.unwrap_or_default(),
                email: email.unwrap_or_default(),
                phone: phone.unwrap_or_default(),
                user_id: user_id.map(RawUserId::Text),
                reason: reason.unwrap_or_default(),
            };
            cli::run_act(action, &input, url.as_deref())
        }
        Commands::Audit {
            limit,
            format,
            local,
            url,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_audit(limit, fmt, url.as_deref(), local)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
