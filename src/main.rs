//! Quakeview - earthquake map and seismic-pattern dashboard.
//!
//! Fetches USGS GeoJSON feeds, derives chart-ready aggregates, and serves
//! them as a small web dashboard or prints them to the terminal.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

mod aggregate;
mod cli;
mod client;
mod errors;
mod models;
mod output;
mod pages;
mod region;
mod server;
mod state;

use aggregate::{Dashboard, DisplayZone};
use cli::{Cli, Command};
use client::{Endpoint, FeedSource, UsgsClient};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Summary(args) => cmd_summary(args),
        Command::Largest(args) => cmd_largest(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Resolve a `--utc-offset` flag.
fn display_zone(offset_minutes: Option<i32>) -> Result<DisplayZone> {
    DisplayZone::from_offset_minutes(offset_minutes).with_context(|| {
        format!(
            "UTC offset out of range: {} minutes",
            offset_minutes.unwrap_or_default()
        )
    })
}

/// Fetch an endpoint and flatten it, treating failures as fatal.
fn fetch_records(client: &UsgsClient, endpoint: Endpoint) -> Result<Vec<models::EventRecord>> {
    let feed = client
        .fetch(endpoint)
        .with_context(|| format!("failed to fetch {} feed", endpoint.as_str()))?;
    Ok(feed.records())
}

/// Execute the `summary` command - print the chart aggregates.
fn cmd_summary(args: cli::SummaryArgs) -> Result<()> {
    let zone = display_zone(args.utc_offset)?;
    let client = UsgsClient::new().context("failed to create USGS client")?;

    let recent = fetch_records(&client, args.feed)?;
    let historical = if args.with_largest {
        fetch_records(&client, Endpoint::Largest)?
    } else {
        Vec::new()
    };

    let dashboard = Dashboard::build(&recent, &historical, aggregate::SortOrder::Desc, &zone);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_dashboard(&mut handle, &dashboard, args.format)?;

    Ok(())
}

/// Execute the `largest` command - print the historical table.
fn cmd_largest(args: cli::LargestArgs) -> Result<()> {
    let zone = display_zone(args.utc_offset)?;
    let client = UsgsClient::new().context("failed to create USGS client")?;

    let records = fetch_records(&client, Endpoint::Largest)?;
    let rows = aggregate::largest_events(&records, args.order, &zone);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_largest(&mut handle, &rows, args.format)?;

    Ok(())
}

/// Open `url` with the platform's opener, logging rather than failing.
fn open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let result = launch("open", &[url]);
    #[cfg(target_os = "windows")]
    let result = launch("cmd", &["/c", "start", url]);
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let result = launch("xdg-open", &[url]);

    if let Err(e) = result {
        warn!("could not open browser for {url}: {e}");
    }
}

fn launch(program: &str, args: &[&str]) -> io::Result<()> {
    std::process::Command::new(program).args(args).spawn().map(drop)
}

/// Execute the `serve` command - start the web server.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        zone: display_zone(args.utc_offset)?,
    };

    // Built outside the async runtime: the blocking client owns its own.
    let source: Arc<dyn FeedSource> = Arc::new(
        UsgsClient::with_base_url(&args.base_url).context("failed to create USGS client")?,
    );

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 Earthquake Visualizer\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Source:  {}", args.base_url);
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    if args.open {
        open_browser(&url);
    }

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_reports_missing_opener() {
        assert!(launch("quakeview-no-such-opener", &["http://127.0.0.1:8080"]).is_err());
    }

    #[test]
    fn test_display_zone_rejects_out_of_range_offset() {
        assert_eq!(display_zone(None).unwrap(), DisplayZone::Local);
        assert!(display_zone(Some(-300)).is_ok());
        assert!(display_zone(Some(24 * 60)).is_err());
    }
}
