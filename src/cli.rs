//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Parser, Subcommand};

use crate::aggregate::SortOrder;
use crate::client::{Endpoint, USGS_BASE_URL};
use crate::output::Format;

/// Earthquake map and seismic-pattern dashboard backed by USGS feeds.
#[derive(Parser, Debug)]
#[command(name = "quakeview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web dashboard
    Serve(ServeArgs),

    /// Print the chart aggregates for a feed
    Summary(SummaryArgs),

    /// Print the largest earthquakes since 1900
    Largest(LargestArgs),
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Display times at this offset from UTC, in minutes (default: host zone)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Fetch feeds from another host serving the USGS paths
    #[arg(long, default_value = USGS_BASE_URL, hide = true)]
    pub base_url: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `summary` command.
#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Feed to aggregate
    #[arg(long, default_value = "2.5_day", value_parser = parse_endpoint)]
    pub feed: Endpoint,

    /// Also fetch the largest-events table
    #[arg(long)]
    pub with_largest: bool,

    /// Display times at this offset from UTC, in minutes (default: host zone)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `largest` command.
#[derive(Parser, Debug)]
pub struct LargestArgs {
    /// Sort by magnitude: asc or desc
    #[arg(long, default_value = "desc", value_parser = parse_order)]
    pub order: SortOrder,

    /// Display dates at this offset from UTC, in minutes (default: host zone)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse a feed endpoint from string.
fn parse_endpoint(s: &str) -> Result<Endpoint, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a sort order from string.
fn parse_order(s: &str) -> Result<SortOrder, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["quakeview", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, 8080);
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.base_url, USGS_BASE_URL);
                assert!(args.utc_offset.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_summary_args() {
        let cli = Cli::try_parse_from([
            "quakeview",
            "--verbose",
            "summary",
            "--feed",
            "all_day",
            "--utc-offset",
            "-300",
            "-f",
            "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.feed, Endpoint::AllDay);
                assert_eq!(args.utc_offset, Some(-300));
                assert_eq!(args.format, Format::Json);
                assert!(!args.with_largest);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_largest_order() {
        let cli = Cli::try_parse_from(["quakeview", "largest", "--order", "asc"]).unwrap();
        match cli.command {
            Command::Largest(args) => assert_eq!(args.order, SortOrder::Asc),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["quakeview", "largest", "--order", "up"]).is_err());
    }
}
