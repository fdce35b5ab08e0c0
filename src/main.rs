//! display-anchor - display output inspection and rotation
//!
//! Entry point for the command-line binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use display_anchor::config::Config;
use display_anchor::display::{
    find_by_id_in, find_by_name_in, DisplayConfigBackend, DisplayError, DisplayService,
    LegacyDisplayBackend, Orientation, OutputIdentity, OutputInfo, RotationOutcome,
};
use display_anchor::names::{JsonNameStore, NameStore};
use display_anchor::platform::fixture::FixtureBackend;

/// Command-line arguments for display-anchor
#[derive(Parser, Debug)]
#[command(name = "display-anchor")]
#[command(version, about = "Stable display identities and output rotation", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "DISPLAY_ANCHOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use a TOML fixture topology instead of the OS display APIs
    #[arg(long, env = "DISPLAY_ANCHOR_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Friendly-name store file
    #[arg(long)]
    pub names: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Directory for a daily log file (in addition to stderr)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List active outputs in enumeration order
    List {
        /// Print JSON instead of diagnostic lines
        #[arg(long)]
        json: bool,
    },

    /// Print the stable key of an output
    Key {
        /// Output key or friendly-name substring
        target: String,
    },

    /// Rotate an output
    Rotate {
        /// Output key or friendly-name substring
        target: String,

        /// Absolute clockwise orientation in degrees
        #[arg(allow_negative_numbers = true, required_unless_present = "by")]
        degrees: Option<isize>,

        /// Rotate relative to the current orientation instead
        #[arg(long, allow_negative_numbers = true, conflicts_with = "degrees")]
        by: Option<isize>,
    },

    /// Read or write user-chosen output names
    Name {
        #[command(subcommand)]
        action: NameAction,
    },
}

/// Name store actions
#[derive(Subcommand, Debug)]
pub enum NameAction {
    /// Show the stored name of an output
    Get {
        /// Output key or friendly-name substring
        target: String,
    },
    /// Store a name for an output (empty removes it)
    Set {
        /// Output key or friendly-name substring
        target: String,
        /// Name to store
        name: String,
    },
    /// Show every stored name
    List,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = Config::load_or_default(&config_path)?
        .with_overrides(args.log_dir.clone(), args.names.clone());

    let _guard = init_logging(&args, &config)?;

    info!("display-anchor v{} ({} {}, {})", env!("CARGO_PKG_VERSION"), env!("BUILD_DATE"), env!("GIT_HASH"), env!("BUILD_TARGET"));
    debug!("Config: {:?}", config);

    if let Err(e) = run(&args, &config) {
        eprintln!("{}", display_anchor::utils::format_user_error(&e));
        return Err(e);
    }
    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("display-anchor")
        .join("config.toml")
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let (config_backend, legacy_backend) = backends(args)?;
    let service = DisplayService::new(config_backend, legacy_backend)
        .with_persistent_rotation(config.rotation.persist);

    match &args.command {
        Command::List { json } => {
            let outputs = service.enumerate()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
                return Ok(());
            }

            let names = open_names(config)?;
            for output in &outputs {
                match names.get(&output.identity.key()) {
                    Some(name) => println!("[{}] {}", name, output),
                    None => println!("{}", output),
                }
            }
        }

        Command::Key { target } => {
            let output = select(&service, target)?;
            println!("{}", output.identity.key());
        }

        Command::Rotate { target, degrees, by } => {
            let output = select(&service, target)?;
            let orientation = match (degrees, by) {
                (_, Some(delta)) => service.current_orientation(&output)?.rotated_by(*delta)?,
                (Some(absolute), None) => Orientation::from_degrees(*absolute)?,
                (None, None) => anyhow::bail!("Either <DEGREES> or --by is required"),
            };

            match service.rotate(&output, orientation)? {
                RotationOutcome::Applied => println!("Rotated {} to {}", output.label(), orientation),
                RotationOutcome::RestartRequired => println!(
                    "Rotated {} to {}; takes effect after a restart",
                    output.label(),
                    orientation
                ),
            }
        }

        Command::Name { action } => {
            let names = open_names(config)?;
            match action {
                NameAction::Get { target } => {
                    let output = select(&service, target)?;
                    match names.get(&output.identity.key()) {
                        Some(name) => println!("{}", name),
                        None => println!("(no name stored for {})", output.identity),
                    }
                }
                NameAction::Set { target, name } => {
                    let output = select(&service, target)?;
                    names.set(&output.identity.key(), name)?;
                }
                NameAction::List => {
                    for (key, name) in names.entries() {
                        println!("{}\t{}", key, name);
                    }
                }
            }
        }
    }

    Ok(())
}

type Backends = (Arc<dyn DisplayConfigBackend>, Arc<dyn LegacyDisplayBackend>);

fn backends(args: &Args) -> Result<Backends> {
    if let Some(path) = &args.fixture {
        info!("Using fixture topology {}", path.display());
        let backend = Arc::new(FixtureBackend::load(path)?);
        let config_backend: Arc<dyn DisplayConfigBackend> = backend.clone();
        let legacy_backend: Arc<dyn LegacyDisplayBackend> = backend;
        return Ok((config_backend, legacy_backend));
    }

    native_backends()
}

#[cfg(windows)]
fn native_backends() -> Result<Backends> {
    let backend = Arc::new(display_anchor::platform::win32::Win32DisplayBackend::new());
    let config_backend: Arc<dyn DisplayConfigBackend> = backend.clone();
    let legacy_backend: Arc<dyn LegacyDisplayBackend> = backend;
    Ok((config_backend, legacy_backend))
}

#[cfg(not(windows))]
fn native_backends() -> Result<Backends> {
    anyhow::bail!("No native display backend on this platform; pass --fixture <topology.toml>")
}

fn open_names(config: &Config) -> Result<JsonNameStore> {
    let path = config.names.resolved_store_path();
    JsonNameStore::open(&path).context(format!("Failed to open name store {}", path.display()))
}

/// Output by exact key, otherwise by friendly-name substring
fn select(service: &DisplayService, target: &str) -> Result<OutputInfo> {
    let outputs = service.enumerate()?;

    let found = match target.parse::<OutputIdentity>() {
        Ok(identity) => find_by_id_in(&outputs, identity),
        Err(_) => find_by_name_in(&outputs, target),
    };

    match found {
        Some(output) => Ok(output.clone()),
        None if outputs.is_empty() => Err(DisplayError::NoOutputsAvailable.into()),
        None => anyhow::bail!("No active output matches '{}'", target),
    }
}

fn init_logging(args: &Args, config: &Config) -> Result<Option<WorkerGuard>> {
    let log_level = match args.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let log_format = args
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("display_anchor={},warn", log_level))
    });

    // Diagnostics go to stderr; stdout carries command output
    if let Some(log_dir) = &config.logging.log_dir {
        std::fs::create_dir_all(log_dir)
            .context(format!("Failed to create log directory: {}", log_dir.display()))?;
        let appender = tracing_appender::rolling::daily(log_dir, "display-anchor.log");
        let (file, guard) = tracing_appender::non_blocking(appender);

        match log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to directory: {}", log_dir.display());
        return Ok(Some(guard));
    }

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(None)
}
