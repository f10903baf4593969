use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rollog::{CallSite, Config, Level, Logger};

/// Append lines read from stdin to a rotating log file
#[derive(Parser, Debug)]
#[command(name = "rollog", version, about)]
struct Args {
    /// Log file path; rotated files are created next to it
    path: PathBuf,

    /// Level every line is written at (fatal is not accepted)
    #[arg(short, long, default_value = "info", value_parser = parse_line_level)]
    level: Level,

    /// Rotate once the file reaches this many bytes
    #[arg(long)]
    max_size_bytes: Option<u64>,

    /// Rotate on this schedule (seconds, at least 60)
    #[arg(long)]
    rotate_interval_secs: Option<u64>,

    /// Also echo every line to stdout
    #[arg(long)]
    console: bool,
}

/// A fatal record exits the process, which would stop after the first line
fn parse_line_level(s: &str) -> std::result::Result<Level, String> {
    match s.parse::<Level>() {
        Ok(Level::Fatal) => Err("fatal would exit after the first line".to_string()),
        Ok(level) => Ok(level),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rollog=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .init();

    let args = Args::parse();

    let config = Config {
        path: args.path,
        level: Level::Debug,
        max_size_bytes: args.max_size_bytes,
        rotate_interval_secs: args.rotate_interval_secs,
        console: args.console,
    };
    let logger = Logger::open(config).context("Failed to open log file")?;
    tracing::info!("Logging stdin to: {}", logger.path().display());

    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("Failed to read stdin")?;
        let site = CallSite::new("stdin", u32::try_from(index + 1).unwrap_or(u32::MAX));
        logger.log(args.level, site, format_args!("{}", line));
    }

    logger.close();
    Ok(())
}
