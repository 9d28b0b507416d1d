//! CAN Bus Monitoring CLI Application
//!
//! This is the command-line front end for the signal matcher library.
//! It uses can-signal-matcher and adds:
//! - Signal configuration loading (JSON) and application settings (TOML)
//! - Frame reception from candump-style traces on a dedicated thread
//! - Live match notifications and a final signal status report

use anyhow::{bail, Context, Result};
use can_signal_matcher::MonitorSession;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

mod config;
mod monitor;
mod trace;

/// CAN Bus Monitoring - Match CAN traffic against signal rules
#[derive(Parser, Debug)]
#[command(name = "can-monitor")]
#[command(about = "Match CAN frames against configured signal rules", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the signal configuration file (JSON)
    #[arg(short, long, value_name = "FILE", default_value = "configurations.json")]
    signals: PathBuf,

    /// Name of the configuration to monitor (default: the first one)
    #[arg(short = 'n', long, value_name = "NAME")]
    configuration: Option<String>,

    /// List available configurations and exit
    #[arg(long)]
    list: bool,

    /// Trace file to replay (candump log format, default: stdin)
    #[arg(short, long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Path to application settings (settings.toml)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Bus Monitoring CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using signal matcher library v{}", can_signal_matcher::VERSION);

    let settings = match &args.settings {
        Some(path) => config::load_settings(path)?,
        None => config::AppSettings::default(),
    };

    let configurations = config::load_configurations(&args.signals)?;

    if args.list {
        for name in config::configuration_names(&configurations) {
            println!("{}", name);
        }
        return Ok(());
    }

    let selected = match &args.configuration {
        Some(name) => config::find_configuration(&configurations, name)
            .with_context(|| format!("Configuration not found: {}", name))?,
        None => match configurations.first() {
            Some(first) => first,
            None => bail!("No valid configuration in {:?}", args.signals),
        },
    };

    log::info!(
        "Monitoring '{}' ({} signal(s))",
        selected.name,
        selected.rules.len()
    );
    for rule in &selected.rules {
        log::debug!("  {}", rule);
        log::trace!("  {}", serde_json::to_string(rule)?);
    }

    let capacity = settings.trace.channel_capacity.max(1);
    let (frames, reader) = match &args.trace {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open trace file: {:?}", path))?;
            trace::spawn_reader(BufReader::new(file), capacity)
        }
        None => trace::spawn_reader(BufReader::new(io::stdin()), capacity),
    };

    let mut session = MonitorSession::new(selected.rules.clone(), settings.session.clone());
    log::debug!("Session settings: {:?}", session.config());
    let snapshot = monitor::run(&mut session, frames, monitor::log_update);

    match reader.join() {
        Ok(stats) if stats.skipped > 0 => {
            log::warn!("{} malformed trace line(s) skipped", stats.skipped)
        }
        Ok(_) => {}
        Err(_) => bail!("Reception thread panicked"),
    }

    if !args.quiet {
        monitor::write_report(&mut io::stdout(), &selected.name, &snapshot, &session.stats())?;
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
