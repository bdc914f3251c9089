//! dosync CLI
//!
//! Host harness for discover/import runs: wires a token source and API
//! base into the synchronizer, runs one operation, and prints the
//! resulting instruction set as JSON for the host to apply.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dosync::api::auth::{EnvTokenProvider, StaticTokenProvider, TokenProvider, TOKEN_ENV_VAR};
use dosync::api::client::DoClient;
use dosync::config::Config;
use dosync::resource::registry;
use dosync::resource::sync::{ComponentContext, Output, Status, Synchronizer};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

/// Reconcile DigitalOcean resources into declarative records
#[derive(Parser, Debug)]
#[command(name = "dosync", version, about, long_about = None)]
struct Args {
    /// API token (falls back to DO_API_TOKEN, then the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API base URL override
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all remote resources of a kind and emit create instructions
    Discover {
        /// Resource kind key (see `dosync kinds`)
        kind: String,

        /// Component context JSON file carrying sources and properties
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Fetch one resource by identifier and emit an update instruction
    Import {
        /// Resource kind key (see `dosync kinds`)
        kind: String,

        /// Provider identifier of the resource to import
        #[arg(long)]
        resource_id: Option<String>,

        /// Component context JSON file carrying sources and properties
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// List supported resource kinds
    Kinds,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("dosync {} started with log level: {:?}", dosync::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("dosync").join("dosync.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".dosync").join("dosync.log");
    }
    PathBuf::from("dosync.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let output = match &args.command {
        Command::Kinds => {
            for key in registry::get_all_kind_keys() {
                if let Some(kind) = registry::get_kind(key) {
                    println!("{key:<24} {}", kind.display_name);
                }
            }
            return Ok(());
        }
        Command::Discover { kind, input } => {
            let ctx = load_context(input.as_deref())?;
            let sync = build_synchronizer(&args)?;
            sync.discover(kind, &ctx).await
        }
        Command::Import {
            kind,
            resource_id,
            input,
        } => {
            let mut ctx = load_context(input.as_deref())?;
            if let Some(id) = resource_id {
                set_resource_id(&mut ctx, id);
            }
            let sync = build_synchronizer(&args)?;
            sync.import(kind, &ctx).await
        }
    };

    print_output(&output)?;

    if output.status == Status::Error {
        std::process::exit(1);
    }

    Ok(())
}

/// Token source chain: flag > environment > config file. The environment
/// lookup is wired up here so the flows themselves never read ambient
/// state.
fn build_synchronizer(args: &Args) -> Result<Synchronizer> {
    let config = Config::load();

    let tokens: Arc<dyn TokenProvider> = if let Some(token) = &args.token {
        Arc::new(StaticTokenProvider::new(token.clone()))
    } else if std::env::var(TOKEN_ENV_VAR).is_ok() {
        Arc::new(EnvTokenProvider)
    } else if let Some(token) = &config.token {
        Arc::new(StaticTokenProvider::new(token.clone()))
    } else {
        // Missing everywhere: hand the env provider to the flow so the
        // failure surfaces as a structured error result, not a panic.
        Arc::new(EnvTokenProvider)
    };

    let api_url = args
        .api_url
        .clone()
        .unwrap_or_else(|| config.effective_api_url());

    let client = DoClient::with_api_base(tokens, &api_url)?;
    Ok(Synchronizer::new(client))
}

fn load_context(path: Option<&Path>) -> Result<ComponentContext> {
    let Some(path) = path else {
        return Ok(ComponentContext::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse component context in {}", path.display()))
}

fn set_resource_id(ctx: &mut ComponentContext, id: &str) {
    if !ctx.properties.is_object() {
        ctx.properties = json!({});
    }
    if let Some(properties) = ctx.properties.as_object_mut() {
        let si = properties
            .entry("si".to_string())
            .or_insert_with(|| json!({}));
        if let Some(si) = si.as_object_mut() {
            si.insert("resourceId".to_string(), json!(id));
        }
    }
}

fn print_output(output: &Output) -> Result<()> {
    let rendered = serde_json::to_string_pretty(output)?;
    println!("{rendered}");
    Ok(())
}
