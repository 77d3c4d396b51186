use std::time::Instant;

use anyhow::{Context, Result};
use headway_core::{load_schedule, LoadProgress, PositionEngine, ScheduleSource};
use headway_transit::{format_gtfs_time, parse_gtfs_time};
use indicatif::{ProgressBar, ProgressStyle};

use crate::SnapshotArgs;

pub async fn run(args: &SnapshotArgs) -> Result<()> {
    let at = parse_gtfs_time(&args.at)
        .with_context(|| format!("Invalid service time '{}', expected HH:MM:SS", args.at))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid progress template")?,
    );
    let schedule = load_schedule(
        &ScheduleSource::parse(&args.routes),
        &ScheduleSource::parse(&args.stops),
        |progress| match progress {
            LoadProgress::Fetching { source } => spinner.set_message(format!("Fetching {source}...")),
            LoadProgress::Parsing { source } => spinner.set_message(format!("Parsing {source}...")),
            LoadProgress::Ready { routes, stops } => {
                spinner.finish_and_clear();
                log::info!("Loaded {routes} routes and {stops} stops");
            }
            LoadProgress::Failed { message } => {
                spinner.finish_and_clear();
                log::error!("{message}");
            }
        },
    )
    .await
    .context("Failed to load schedule documents")?;

    let mut engine = PositionEngine::default();
    let frame = engine.compute_frame(&schedule, f64::from(at), Instant::now());

    log::info!(
        "{} vehicles active at {}",
        frame.vehicle_count(),
        format_gtfs_time(at)
    );
    for (route_id, count) in frame.vehicles_by_route() {
        let name = schedule
            .get_route(&route_id)
            .map(|route| route.display_name().to_string())
            .unwrap_or_else(|| route_id.to_string());
        log::info!("  {name}: {count}");
    }
    log::debug!("{} stops visited", frame.visited_stop_ids.len());

    if args.json {
        let json = serde_json::to_string_pretty(&frame).context("Failed to serialize frame")?;
        println!("{json}");
    }

    Ok(())
}
