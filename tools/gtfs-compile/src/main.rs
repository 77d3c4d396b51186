use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod compile;
mod snapshot;

#[derive(Parser, Debug)]
#[command(
    name = "gtfs-compile",
    author,
    version,
    about = "Compile GTFS feeds into frequency-band route documents",
    long_about = "Joins the routes, trips, shapes, stops, stop_times and frequencies tables \
                  of a GTFS feed into two JSON documents: one record per route with its \
                  simplified shapes, stops and merged frequency bands, and a deduplicated \
                  stop list.\n\n\
                  The snapshot command loads those documents back and prints the vehicles \
                  a frequency-based simulation would show at a given service time."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a GTFS directory into routes.json and stops.json
    Compile(CompileArgs),
    /// Print the active vehicles at a service time
    Snapshot(SnapshotArgs),
}

#[derive(clap::Args, Debug)]
struct CompileArgs {
    /// Directory searched for the GTFS feed directory
    #[arg(short, long, default_value = ".")]
    working_dir: PathBuf,

    /// Case-insensitive substring identifying the feed directory
    #[arg(short, long, default_value = "gtfs")]
    source_pattern: String,

    /// Directory the documents are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File name of the route document
    #[arg(long, default_value = "routes.json")]
    routes_file: String,

    /// File name of the stop document
    #[arg(long, default_value = "stops.json")]
    stops_file: String,

    /// Pretty-print the documents
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args, Debug)]
struct SnapshotArgs {
    /// Route document, as a file path or http(s) URL
    #[arg(long)]
    routes: String,

    /// Stop document, as a file path or http(s) URL
    #[arg(long)]
    stops: String,

    /// Service time, HH:MM:SS (hours may exceed 23)
    #[arg(long)]
    at: String,

    /// Print the full frame as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    match args.command {
        Command::Compile(compile_args) => compile::run(&compile_args),
        Command::Snapshot(snapshot_args) => snapshot::run(&snapshot_args).await,
    }
}
