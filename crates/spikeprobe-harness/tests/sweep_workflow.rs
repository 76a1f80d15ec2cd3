// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Integration Tests: Sweep Workflow
//!
//! Runs both sweep strategies against the toy neuron and checks the result
//! logs end to end:
//! - Full 65,280-point coordinate sweep → replay verification
//! - Preset sweep over the whole firing-mode table
//! - Abort and backend failure leave a valid partial log

mod common;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::Ordering;

use common::{expected_first_cycle, failing_toy_neuron, toy_neuron};
use spikeprobe_config::{CoordinateSweepConfig, PresetSweepConfig};
use spikeprobe_harness::{
    read_coordinate_log, verify_coordinate_order, CoordinateRecord, CycleDriver, DecodePolicy,
    DutHandle, EnvironmentFailure, HarnessError, LogFormat, ResultLogger, SweepEngine,
    FULL_COORDINATE_POINTS,
};

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

fn engine() -> SweepEngine {
    SweepEngine::new(DecodePolicy::SignedInteger, 500_000)
}

fn read_records(path: &Path) -> Vec<CoordinateRecord> {
    let file = File::open(path).unwrap();
    read_coordinate_log(BufReader::new(file)).unwrap()
}

// ═══════════════════════════════════════════════════════════
// Coordinate Sweep
// ═══════════════════════════════════════════════════════════

#[test]
fn test_full_coordinate_sweep_log_replays_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_sweep.log");

    let engine = engine();
    let mut driver = CycleDriver::new(toy_neuron());
    let mut dut = DutHandle::new();
    let mut logger = ResultLogger::open(&path, LogFormat::Coordinate).unwrap();

    let summary = engine
        .run_coordinate_sweep(&mut driver, &mut dut, &mut logger)
        .unwrap();
    logger.close().unwrap();

    assert_eq!(summary.points, FULL_COORDINATE_POINTS);
    assert_eq!(summary.samples, FULL_COORDINATE_POINTS);
    // Initial reset + (dwell + reset) per point
    assert_eq!(summary.cycles, 1 + 2 * FULL_COORDINATE_POINTS as u64);
    assert_eq!(dut.clk_period_us, 500_000);

    let records = read_records(&path);
    let report = verify_coordinate_order(&records, Some(FULL_COORDINATE_POINTS));
    assert!(report.is_ok(), "{:?}", report.first_violation);

    let first = &records[0];
    assert_eq!((first.cycle, first.ui_in, first.a, first.b), (2, 0, 0, 0));
    assert_eq!(first.value, -65.0);

    let last = records.last().unwrap();
    assert_eq!((last.ui_in, last.a, last.b), (254, 15, 15));
    assert_eq!(last.cycle, 2 + 2 * (FULL_COORDINATE_POINTS as u64 - 1));
}

#[test]
fn test_each_point_starts_from_reset() {
    let engine = engine().with_coordinate(CoordinateSweepConfig {
        current_end: 3,
        ..CoordinateSweepConfig::default()
    });
    let mut driver = CycleDriver::new(toy_neuron());
    let mut dut = DutHandle::new();

    let mut points = 0;
    engine
        .run_coordinate_sweep_with(&mut driver, &mut dut, |point| {
            assert!(point.closed);
            assert_eq!(point.samples.len(), 1);
            let sample = &point.samples[0];
            let spikeprobe_harness::ParameterEncoding::Coordinate(coordinate) = point.parameter
            else {
                panic!("coordinate sweep produced {:?}", point.parameter);
            };
            assert_eq!(sample.ui_in, point.stimulus);
            assert_eq!(
                sample.raw as i8,
                expected_first_cycle(point.stimulus, coordinate.a(), coordinate.b())
            );
            points += 1;
            Ok(())
        })
        .unwrap();
    assert_eq!(points, 3 * 256);
}

#[test]
fn test_abort_leaves_valid_partial_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aborted.log");

    let engine = engine();
    let abort = engine.abort_handle();
    let mut driver = CycleDriver::new(toy_neuron());
    let mut dut = DutHandle::new();

    let err = {
        let mut logger = ResultLogger::open(&path, LogFormat::Coordinate).unwrap();
        engine
            .run_coordinate_sweep_with(&mut driver, &mut dut, |point| {
                for sample in &point.samples {
                    logger.write(sample)?;
                }
                if logger.records_written() == 100 {
                    abort.store(true, Ordering::Relaxed);
                }
                Ok(())
            })
            .unwrap_err()
    };
    assert!(matches!(err, HarnessError::Aborted { completed_points: 100 }));

    let records = read_records(&path);
    assert_eq!(records.len(), 100);
    assert!(verify_coordinate_order(&records, None).is_ok());
    assert!(!verify_coordinate_order(&records, Some(FULL_COORDINATE_POINTS)).is_ok());
}

#[test]
fn test_backend_failure_is_fatal_and_log_stays_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("failed.log");

    let engine = engine();
    // Cycle 1 = initial reset, point n dwells on 2 + 2n and resets on 3 + 2n
    let mut driver = CycleDriver::new(failing_toy_neuron(51));
    let mut dut = DutHandle::new();

    let err = {
        let mut logger = ResultLogger::open(&path, LogFormat::Coordinate).unwrap();
        engine
            .run_coordinate_sweep(&mut driver, &mut dut, &mut logger)
            .unwrap_err()
    };
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        HarnessError::Environment(EnvironmentFailure::StepFailed { cycle: 50, .. })
    ));

    let records = read_records(&path);
    assert_eq!(records.len(), 25);
    assert!(verify_coordinate_order(&records, None).is_ok());
}

#[test]
fn test_zero_dwell_and_reset_fail_without_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale.log");

    let engine = engine().with_coordinate(CoordinateSweepConfig {
        current_end: 1,
        dwell_cycles: 0,
        point_reset_cycles: 0,
        ..CoordinateSweepConfig::default()
    });
    let mut driver = CycleDriver::new(toy_neuron());
    let mut dut = DutHandle::new();

    let err = {
        let mut logger = ResultLogger::open(&path, LogFormat::Coordinate).unwrap();
        engine
            .run_coordinate_sweep(&mut driver, &mut dut, &mut logger)
            .unwrap_err()
    };
    assert!(matches!(err, HarnessError::Config(_)));
    assert_eq!(driver.cycle(), 0);
    assert!(read_records(&path).is_empty());
}

// ═══════════════════════════════════════════════════════════
// Preset Sweep
// ═══════════════════════════════════════════════════════════

#[test]
fn test_preset_sweep_covers_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_presets.log");

    let engine = engine();
    let mut driver = CycleDriver::new(toy_neuron());
    let mut dut = DutHandle::new();
    let mut logger = ResultLogger::open(&path, LogFormat::Preset).unwrap();

    let summary = engine.run_preset_sweep(&mut driver, &mut dut, &mut logger).unwrap();
    assert_eq!(logger.records_written(), 700);
    drop(logger);

    assert_eq!(summary.points, 7);
    assert_eq!(summary.samples, 700);
    assert_eq!(summary.cycles, 1 + 7 * (100 + 1));
    assert_eq!(engine.preset_sample_count(), 700);

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("clk preset name ui_in uo_out"));

    let body: Vec<Vec<&str>> = lines.map(|l| l.split_whitespace().collect()).collect();
    assert_eq!(body.len(), 700);
    for (i, fields) in body.iter().enumerate() {
        let preset = i / 100;
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[1], preset.to_string());
        assert_eq!(fields[2], spikeprobe_harness::FIRING_MODES[preset].name);
        assert_eq!(fields[3], "255");
    }

    let cycles: Vec<u64> = body.iter().map(|f| f[0].parse().unwrap()).collect();
    assert!(cycles.windows(2).all(|w| w[0] < w[1]));
    // One cycle per sample inside a preset, a reset cycle between presets
    assert_eq!(cycles[1] - cycles[0], 1);
    assert_eq!(cycles[100] - cycles[99], 2);
}

#[test]
fn test_preset_sweep_with_custom_drive_and_dwell() {
    let engine = engine().with_preset(PresetSweepConfig {
        drive_stimulus: 40,
        dwell_cycles: 3,
        ..PresetSweepConfig::default()
    });
    let mut driver = CycleDriver::new(toy_neuron());
    let mut dut = DutHandle::new();

    let mut seen = Vec::new();
    let summary = engine
        .run_preset_sweep_with(&mut driver, &mut dut, |point| {
            assert_eq!(point.stimulus, 40);
            assert_eq!(point.samples.len(), 3);
            seen.push(point.parameter.byte());
            Ok(())
        })
        .unwrap();

    assert_eq!(seen, [0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(summary.samples, 21);
}
