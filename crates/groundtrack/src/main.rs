//! `gtrack` - CLI for groundtrack
//!
//! This binary reports a satellite's position and ground track and manages the
//! local store of named TLEs.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use groundtrack::cli::{Cli, Command, ConfigCommand, TleCommand, TrackCommand};
use groundtrack::{
    build_report, build_report_concurrent, init_logging, split_at_dateline, Config,
    GroundTrackSample, SatelliteReport, SgpPropagator, TleRecord, TleStore, UpsertOutcome,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Track(track_cmd) => handle_track(&config, &track_cmd).await,
        Command::Tle(tle_cmd) => handle_tle(&config, tle_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_track(config: &Config, cmd: &TrackCommand) -> anyhow::Result<()> {
    let gravity = config.propagator.gravity_model;
    let propagator = match (&cmd.name, &cmd.line1, &cmd.line2) {
        (Some(name), _, _) => {
            let store = TleStore::open(config.database_path())?;
            store.require(name)?.propagator(gravity)?
        }
        (None, Some(line1), Some(line2)) => SgpPropagator::from_tle(None, line1, line2, gravity)?,
        _ => anyhow::bail!("either --name or both --line1 and --line2 are required"),
    };

    let reference = cmd.at.unwrap_or_else(Utc::now);
    let iteration = config.iteration();

    let report = if cmd.concurrent || config.track.concurrent {
        build_report_concurrent(Arc::new(propagator), reference, &config.track, iteration).await
    } else {
        build_report(&propagator, reference, &config.track, &iteration)
    }
    .context("failed to compute satellite position")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SatelliteReport) {
    let geo = report.position.geodetic;
    let r = report.position.vector;
    let v = report.velocity;

    println!("Satellite position at {}", report.timestamp.to_rfc3339());
    println!("================================================");
    println!("  Latitude:   {:>12.4} deg", geo.latitude);
    println!("  Longitude:  {:>12.4} deg", geo.longitude);
    println!("  Altitude:   {:>12.1} km", geo.altitude);
    println!();
    println!("  Position:   x={:.2} y={:.2} z={:.2} km", r.x, r.y, r.z);
    println!("  Velocity:   x={:.6} y={:.6} z={:.6} km/s", v.x, v.y, v.z);

    print_track("Past track", &report.past);
    print_track("Future track", &report.future);
}

fn print_track(title: &str, samples: &[GroundTrackSample]) {
    let points: Vec<_> = samples.iter().map(|s| s.geodetic).collect();
    let segments = split_at_dateline(&points).len();

    println!();
    println!("{title} ({} samples, {segments} segments)", samples.len());
    println!("  {:>6}  {:>10}  {:>11}  {:>9}", "min", "lat", "lon", "alt km");
    for sample in samples {
        println!(
            "  {:>+6}  {:>10.4}  {:>11.4}  {:>9.1}",
            sample.offset_minutes,
            sample.geodetic.latitude,
            sample.geodetic.longitude,
            sample.geodetic.altitude
        );
    }
}

fn handle_tle(config: &Config, cmd: TleCommand) -> anyhow::Result<()> {
    let store = TleStore::open(config.database_path())?;

    match cmd {
        TleCommand::Add { name, line1, line2 } => {
            let record = TleRecord::new(name, &line1, &line2);
            // Reject lines SGP4 cannot use before they reach the store
            record.propagator(config.propagator.gravity_model)?;
            match store.upsert(&record)? {
                UpsertOutcome::Inserted(_) => println!("Stored '{}'.", record.name),
                UpsertOutcome::Updated(_) => println!("Updated '{}'.", record.name),
                UpsertOutcome::Unchanged(_) => println!("'{}' is already up to date.", record.name),
            }
        }
        TleCommand::List { json } => {
            let records = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No stored TLEs.");
            } else {
                for record in &records {
                    println!("{:<24} updated {}", record.name, record.updated_at.to_rfc3339());
                }
            }
        }
        TleCommand::Show { name } => {
            let record = store.require(&name)?;
            println!("{}", record.name);
            println!("{}", record.line1);
            println!("{}", record.line2);
        }
        TleCommand::Remove { name } => {
            if store.delete(&name)? {
                println!("Removed '{name}'.");
            } else {
                println!("No TLE named '{name}'.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Track]");
                println!("  Step (minutes):     {}", config.track.step_minutes);
                println!("  Window (minutes):   {}", config.track.window_minutes);
                println!("  Concurrent:         {}", config.track.concurrent);
                println!();
                println!("[Transform]");
                println!("  Max iterations:     {}", config.transform.max_iterations);
                println!("  Tolerance (rad):    {:e}", config.transform.tolerance_rad);
                println!();
                println!("[Propagator]");
                println!("  Gravity model:      {}", config.propagator.gravity_model);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
