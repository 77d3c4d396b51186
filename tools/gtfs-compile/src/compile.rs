use anyhow::{bail, Context, Result};
use headway_transit::compiler::{self, ArtifactPaths};
use headway_transit::gtfs::locate_source;
use indicatif::{ProgressBar, ProgressStyle};

use crate::CompileArgs;

pub fn run(args: &CompileArgs) -> Result<()> {
    log::info!("=== GTFS Compiler ===");
    log::info!("Working directory: {}", args.working_dir.display());
    log::info!("Output directory: {}", args.output_dir.display());

    if !args.output_dir.is_dir() {
        bail!("Output directory does not exist: {}", args.output_dir.display());
    }

    // Phase 1: Locate the feed
    log::info!("");
    log::info!("Phase 1: Locating GTFS directory matching '{}'...", args.source_pattern);
    let source = locate_source(&args.working_dir, &args.source_pattern)
        .context("Failed to locate GTFS feed")?;
    log::info!("  Using {}", source.display());

    // Phase 2: Read and compile
    log::info!("");
    log::info!("Phase 2: Compiling schedule...");
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.set_message("Reading tables...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let compiled = compiler::compile(&source);
    spinner.finish_and_clear();
    let compiled = compiled.context("Failed to compile GTFS feed")?;

    log::info!(
        "  {} routes, {} stops",
        compiled.routes.len(),
        compiled.stops.len()
    );
    if compiled.routes.is_empty() {
        log::warn!("  No route has a usable shape; the documents will be empty");
    }

    // Phase 3: Write documents
    log::info!("");
    log::info!("Phase 3: Writing documents...");
    let paths = ArtifactPaths {
        routes: args.output_dir.join(&args.routes_file),
        stops: args.output_dir.join(&args.stops_file),
    };
    compiler::write_artifacts(&compiled, &paths, args.pretty)
        .context("Failed to write documents")?;
    log::info!("  Wrote {}", paths.routes.display());
    log::info!("  Wrote {}", paths.stops.display());

    log::info!("");
    compiled.stats.log_summary();

    Ok(())
}
