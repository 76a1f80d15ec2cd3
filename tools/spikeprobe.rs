// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `spikeprobe` command-line tool
//!
//! Offline companion to the harness: inspects the active configuration,
//! prints the firing-mode table and verifies coordinate sweep logs produced
//! by an earlier run. Running a sweep needs a simulation backend and is done
//! from the integrator's own test binary.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};

use spikeprobe::config::{load_config, validate_config, SpikeprobeConfig};
use spikeprobe::harness::sweep::CoordinateSweep;
use spikeprobe::harness::{
    read_coordinate_log, scenarios_from_config, verify_coordinate_order, FIRING_MODES,
    PRESET_COUNT,
};
use spikeprobe::observability::{debug_flags_help, init_logging, parse_debug_flags, FileLogging};

/// Verification harness tooling for the spiking-neuron tile
#[derive(Parser, Debug)]
#[command(name = "spikeprobe", author, version, about, long_about = None)]
struct Cli {
    /// Path to spikeprobe.toml (default: search cwd and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override a config value, e.g. `--set decode_policy=signed_fixed_point`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the firing-mode preset table
    Presets {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Verify ordering and completeness of a coordinate sweep log
    CheckLog {
        /// Log file written by a coordinate sweep
        path: PathBuf,

        /// Accept a clean prefix of an interrupted run
        #[arg(long)]
        partial: bool,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show sweep sizes and durations for the active configuration
    Plan,

    /// List canonical and configured scenarios
    Scenarios,
}

fn parse_overrides(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut overrides = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid override '{}', expected KEY=VALUE", pair);
        };
        overrides.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(overrides)
}

fn main() -> Result<()> {
    // --debug-<crate> flags are handled by the observability crate, not clap
    let clap_args: Vec<String> = env::args().filter(|arg| !arg.starts_with("--debug-")).collect();
    let matches = Cli::command()
        .after_help(debug_flags_help())
        .get_matches_from(clap_args);
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let overrides = parse_overrides(&cli.overrides)?;
    let config = load_config(cli.config.as_deref(), Some(&overrides))
        .context("Failed to load spikeprobe configuration")?;
    validate_config(&config).context("Invalid spikeprobe configuration")?;

    let debug_flags = parse_debug_flags();
    let file_logging = config.logging.file_logging.then(|| FileLogging {
        log_dir: config.logging.log_dir.clone(),
        retention_runs: config.logging.retention_runs,
    });
    let _guard = init_logging(&debug_flags, &config.logging.level, file_logging.as_ref())?;
    debug!("Debug flags: {:?}", debug_flags.enabled_crates);

    match cli.command {
        Command::Presets { json } => print_presets(json),
        Command::CheckLog {
            path,
            partial,
            json,
        } => check_log(&config, path, partial, json),
        Command::Plan => {
            print_plan(&config);
            Ok(())
        }
        Command::Scenarios => print_scenarios(&config),
    }
}

fn print_presets(json: bool) -> Result<()> {
    if json {
        let table: Vec<_> = FIRING_MODES
            .iter()
            .enumerate()
            .map(|(index, mode)| json!({ "index": index, "mode": mode }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("{:<6} {:<5} {:<24} {:>6} {:>6} {:>7} {:>6}", "index", "name", "behavior", "a", "b", "c", "d");
    for (index, mode) in FIRING_MODES.iter().enumerate() {
        println!(
            "{:<6} {:<5} {:<24} {:>6} {:>6} {:>7} {:>6}",
            index, mode.name, mode.description, mode.a, mode.b, mode.c, mode.d
        );
    }
    Ok(())
}

fn check_log(config: &SpikeprobeConfig, path: PathBuf, partial: bool, json: bool) -> Result<()> {
    let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    let records = read_coordinate_log(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let expected = if partial {
        None
    } else {
        Some(CoordinateSweep::point_count(config.sweep.coordinate.current_end))
    };
    let report = verify_coordinate_order(&records, expected);
    info!(
        "[CHECK-LOG] {}: {} records, expected {:?}",
        path.display(),
        report.records,
        report.expected
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.first_violation {
            None => println!("OK: {} records in sweep order", report.records),
            Some(violation) => println!("FAIL at line {}: {}", violation.line, violation.reason),
        }
    }

    if let Some(violation) = report.first_violation {
        bail!(
            "{} is not a valid coordinate sweep log (line {}: {})",
            path.display(),
            violation.line,
            violation.reason
        );
    }
    Ok(())
}

fn print_plan(config: &SpikeprobeConfig) {
    let coordinate = &config.sweep.coordinate;
    let coordinate_points = CoordinateSweep::point_count(coordinate.current_end) as u64;
    let coordinate_cycles = u64::from(coordinate.initial_reset_cycles)
        + coordinate_points
            * (u64::from(coordinate.dwell_cycles) + u64::from(coordinate.point_reset_cycles));

    let preset = &config.sweep.preset;
    let preset_samples = PRESET_COUNT as u64 * u64::from(preset.dwell_cycles);
    let preset_cycles = u64::from(preset.initial_reset_cycles)
        + PRESET_COUNT as u64
            * (u64::from(preset.dwell_cycles) + u64::from(preset.point_reset_cycles));

    println!("decode policy:    {}", config.decode.policy.as_str());
    println!("sweep clock:      {} us", config.clock.sweep_period_us);
    println!();
    println!("coordinate sweep: current < {}", coordinate.current_end);
    println!("  points:         {}", coordinate_points);
    println!("  cycles:         {}", coordinate_cycles);
    println!("  log:            {}", config.output.coordinate_log.display());
    println!();
    println!("preset sweep:     drive {}, dwell {}", preset.drive_stimulus, preset.dwell_cycles);
    println!("  samples:        {}", preset_samples);
    println!("  cycles:         {}", preset_cycles);
    println!("  log:            {}", config.output.preset_log.display());
}

fn print_scenarios(config: &SpikeprobeConfig) -> Result<()> {
    let scenarios = scenarios_from_config(config)?;
    for scenario in &scenarios {
        let stimulus = scenario
            .stimulus
            .map_or_else(|| "-".to_string(), |(ui_in, uio_in)| format!("ui_in={} uio_in={}", ui_in, uio_in));
        println!(
            "{:<12} clock {} us, reset {}{}, {}, step {}, check {}, observe {}",
            scenario.name,
            scenario.clock_period_us,
            scenario.reset_cycles,
            if scenario.release_reset { "" } else { " (held)" },
            stimulus,
            scenario.step_cycles,
            scenario.predicate.describe(),
            scenario.observe_cycles
        );
    }
    Ok(())
}
