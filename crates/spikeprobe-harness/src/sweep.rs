// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Sweep Engine

Two exhaustive, strictly sequential strategies:

```text
Coordinate sweep                          Preset sweep
  for current in 0..current_end             for preset in 0..7
    for a in 0..16                            ui_in  = drive
      for b in 0..16                          uio_in = preset
        ui_in  = current                      repeat dwell (100):
        uio_in = (a << 4) | b                   step 1, record
        step dwell (1), record                reset (1)
        reset (1)
```

Each point is isolated from the previous one only by the explicit reset; no
other state is cleared. The enumeration order is exposed through the pure
[`CoordinateSweep`] and [`PresetSweep`] iterators, so it can be checked
without a DUT.

Cancellation is cooperative: the abort flag is read before every point and the
run stops with [`HarnessError::Aborted`] after the last completed point has
been handed to the sink.
*/

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use spikeprobe_config::{CoordinateSweepConfig, PresetSweepConfig, SpikeprobeConfig};
use tracing::{debug, info, warn};

use crate::codec::{DecodePolicy, ParameterCoordinate, ParameterEncoding, NIBBLE_MAX};
use crate::driver::{CycleDriver, Sample};
use crate::dut::{ClockStepper, DutHandle};
use crate::error::{HarnessError, HarnessResult};
use crate::logger::ResultLogger;
use crate::presets::{FiringMode, FIRING_MODES, PRESET_COUNT};
use crate::reset::reset;

/// Exclusive upper bound of the stimulus current in a full sweep
pub const FULL_CURRENT_END: u16 = 255;

const COORDINATES_PER_CURRENT: usize = (NIBBLE_MAX as usize + 1) * (NIBBLE_MAX as usize + 1);

/// Points in a full coordinate sweep (255 × 16 × 16)
pub const FULL_COORDINATE_POINTS: usize = FULL_CURRENT_END as usize * COORDINATES_PER_CURRENT;

const PROGRESS_INTERVAL: usize = 4096;

/// One `(current, a, b)` point of the coordinate sweep
///
/// Ordering is lexicographic on `(current, a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CoordinateTriple {
    pub current: u8,
    pub coordinate: ParameterCoordinate,
}

impl CoordinateTriple {
    /// Triple at position `index` of a full sweep
    pub fn from_ordinal(index: usize) -> Option<Self> {
        if index >= FULL_COORDINATE_POINTS {
            return None;
        }
        let current = (index / COORDINATES_PER_CURRENT) as u8;
        let packed = (index % COORDINATES_PER_CURRENT) as u8;
        Some(Self {
            current,
            coordinate: ParameterCoordinate::from_byte(packed),
        })
    }
}

/// Lexicographic enumeration of coordinate sweep points
#[derive(Debug, Clone)]
pub struct CoordinateSweep {
    next: usize,
    end: usize,
}

impl CoordinateSweep {
    /// All 65,280 points
    pub fn full() -> Self {
        Self::with_current_end(FULL_CURRENT_END)
    }

    /// Points with `current < current_end` (clamped to the full range)
    pub fn with_current_end(current_end: u16) -> Self {
        Self {
            next: 0,
            end: Self::point_count(current_end),
        }
    }

    /// Number of points for a given `current_end`
    pub fn point_count(current_end: u16) -> usize {
        current_end.min(FULL_CURRENT_END) as usize * COORDINATES_PER_CURRENT
    }
}

impl Iterator for CoordinateSweep {
    type Item = CoordinateTriple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let triple = CoordinateTriple::from_ordinal(self.next);
        self.next += 1;
        triple
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CoordinateSweep {}

/// Enumeration of the firing-mode table in index order
#[derive(Debug, Clone, Default)]
pub struct PresetSweep {
    next: usize,
}

impl PresetSweep {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for PresetSweep {
    type Item = (u8, &'static FiringMode);

    fn next(&mut self) -> Option<Self::Item> {
        let mode = FIRING_MODES.get(self.next)?;
        let index = self.next as u8;
        self.next += 1;
        Some((index, mode))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = PRESET_COUNT.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PresetSweep {}

/// One iteration of a sweep and the samples taken during its dwell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Position within the sweep, starting at 0
    pub ordinal: usize,
    pub stimulus: u8,
    pub parameter: ParameterEncoding,
    pub samples: Vec<Sample>,
    /// Set once the dwell period has ended
    pub closed: bool,
}

impl SweepPoint {
    fn open(ordinal: usize, stimulus: u8, parameter: ParameterEncoding) -> Self {
        Self {
            ordinal,
            stimulus,
            parameter,
            samples: Vec::new(),
            closed: false,
        }
    }

    fn record(&mut self, sample: Sample) {
        debug_assert!(!self.closed, "sample recorded after dwell ended");
        self.samples.push(sample);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Aggregate statistics of a finished sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepSummary {
    pub points: usize,
    pub samples: usize,
    /// Cycles elapsed, including resets
    pub cycles: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SweepSummary {
    fn absorb(&mut self, point: &SweepPoint) {
        self.points += 1;
        for sample in &point.samples {
            let value = sample.value.as_f64();
            self.samples += 1;
            self.min = Some(self.min.map_or(value, |m| m.min(value)));
            self.max = Some(self.max.map_or(value, |m| m.max(value)));
        }
    }
}

/// Runs coordinate and preset sweeps against a DUT
pub struct SweepEngine {
    policy: DecodePolicy,
    clock_period_us: u64,
    coordinate: CoordinateSweepConfig,
    preset: PresetSweepConfig,
    abort: Arc<AtomicBool>,
}

impl SweepEngine {
    /// Engine with default sweep settings
    pub fn new(policy: DecodePolicy, clock_period_us: u64) -> Self {
        Self {
            policy,
            clock_period_us,
            coordinate: CoordinateSweepConfig::default(),
            preset: PresetSweepConfig::default(),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(config: &SpikeprobeConfig) -> Self {
        Self::new(config.decode.policy.into(), config.clock.sweep_period_us)
            .with_coordinate(config.sweep.coordinate.clone())
            .with_preset(config.sweep.preset.clone())
    }

    pub fn with_coordinate(mut self, settings: CoordinateSweepConfig) -> Self {
        self.coordinate = settings;
        self
    }

    pub fn with_preset(mut self, settings: PresetSweepConfig) -> Self {
        self.preset = settings;
        self
    }

    /// Shared flag that stops the run before the next point when set
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Points the configured coordinate sweep will visit
    pub fn coordinate_point_count(&self) -> usize {
        CoordinateSweep::point_count(self.coordinate.current_end)
    }

    /// Samples the configured preset sweep will record
    pub fn preset_sample_count(&self) -> usize {
        PRESET_COUNT * self.preset.dwell_cycles as usize
    }

    /// Reject settings that would record stale or unisolated samples
    fn check_cycles(settings: [(&str, u32); 3]) -> HarnessResult<()> {
        for (name, cycles) in settings {
            if cycles == 0 {
                return Err(HarnessError::Config(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    fn check_abort(&self, completed_points: usize) -> HarnessResult<()> {
        if self.abort.load(Ordering::Relaxed) {
            warn!(
                "[SWEEP] Abort requested after {} points",
                completed_points
            );
            return Err(HarnessError::Aborted { completed_points });
        }
        Ok(())
    }

    /// Exhaustive `(current, a, b)` sweep; `on_point` sees every closed point
    pub fn run_coordinate_sweep_with<S, F>(
        &self,
        driver: &mut CycleDriver<S>,
        dut: &mut DutHandle,
        mut on_point: F,
    ) -> HarnessResult<SweepSummary>
    where
        S: ClockStepper,
        F: FnMut(&SweepPoint) -> HarnessResult<()>,
    {
        let settings = &self.coordinate;
        Self::check_cycles([
            ("sweep.coordinate.dwell_cycles", settings.dwell_cycles),
            ("sweep.coordinate.point_reset_cycles", settings.point_reset_cycles),
            ("sweep.coordinate.initial_reset_cycles", settings.initial_reset_cycles),
        ])?;
        let total = self.coordinate_point_count();
        let start_cycle = driver.cycle();
        info!(
            "[SWEEP] Coordinate sweep: {} points, current < {}, policy {}",
            total,
            settings.current_end.min(FULL_CURRENT_END),
            self.policy.name()
        );

        driver.start_clock(dut, self.clock_period_us)?;
        reset(driver, dut, settings.initial_reset_cycles)?;

        let mut summary = SweepSummary::default();
        for (ordinal, triple) in CoordinateSweep::with_current_end(settings.current_end).enumerate() {
            self.check_abort(ordinal)?;

            let parameter = ParameterEncoding::Coordinate(triple.coordinate);
            let mut point = SweepPoint::open(ordinal, triple.current, parameter);
            dut.ui_in = triple.current;
            dut.uio_in = parameter.byte();

            driver.step(dut, settings.dwell_cycles)?;
            point.record(driver.sample(dut, parameter, self.policy));
            point.close();

            on_point(&point)?;
            summary.absorb(&point);
            reset(driver, dut, settings.point_reset_cycles)?;

            if (ordinal + 1) % PROGRESS_INTERVAL == 0 {
                debug!(
                    "[SWEEP] {}/{} points (current={})",
                    ordinal + 1,
                    total,
                    triple.current
                );
            }
        }

        summary.cycles = driver.cycle() - start_cycle;
        log_summary("Coordinate", &summary);
        Ok(summary)
    }

    /// Firing-mode sweep; `on_point` sees every closed point
    pub fn run_preset_sweep_with<S, F>(
        &self,
        driver: &mut CycleDriver<S>,
        dut: &mut DutHandle,
        mut on_point: F,
    ) -> HarnessResult<SweepSummary>
    where
        S: ClockStepper,
        F: FnMut(&SweepPoint) -> HarnessResult<()>,
    {
        let settings = &self.preset;
        Self::check_cycles([
            ("sweep.preset.dwell_cycles", settings.dwell_cycles),
            ("sweep.preset.point_reset_cycles", settings.point_reset_cycles),
            ("sweep.preset.initial_reset_cycles", settings.initial_reset_cycles),
        ])?;
        let start_cycle = driver.cycle();
        info!(
            "[SWEEP] Preset sweep: {} presets x {} cycles, drive {}, policy {}",
            PRESET_COUNT,
            settings.dwell_cycles,
            settings.drive_stimulus,
            self.policy.name()
        );

        driver.start_clock(dut, self.clock_period_us)?;
        reset(driver, dut, settings.initial_reset_cycles)?;

        let mut summary = SweepSummary::default();
        for (ordinal, (index, mode)) in PresetSweep::new().enumerate() {
            self.check_abort(ordinal)?;

            let parameter = ParameterEncoding::preset(index as usize)?;
            let mut point = SweepPoint::open(ordinal, settings.drive_stimulus, parameter);
            dut.ui_in = settings.drive_stimulus;
            dut.uio_in = parameter.byte();

            for _ in 0..settings.dwell_cycles {
                driver.tick(dut)?;
                point.record(driver.sample(dut, parameter, self.policy));
            }
            point.close();

            on_point(&point)?;
            summary.absorb(&point);
            reset(driver, dut, settings.point_reset_cycles)?;

            debug!(
                "[SWEEP] Preset {} ({}) done, {} samples",
                index,
                mode.name,
                point.samples.len()
            );
        }

        summary.cycles = driver.cycle() - start_cycle;
        log_summary("Preset", &summary);
        Ok(summary)
    }

    /// Coordinate sweep writing every sample to `logger`
    pub fn run_coordinate_sweep<S, W>(
        &self,
        driver: &mut CycleDriver<S>,
        dut: &mut DutHandle,
        logger: &mut ResultLogger<W>,
    ) -> HarnessResult<SweepSummary>
    where
        S: ClockStepper,
        W: Write,
    {
        self.run_coordinate_sweep_with(driver, dut, |point| write_point(logger, point))
    }

    /// Preset sweep writing every sample to `logger`
    pub fn run_preset_sweep<S, W>(
        &self,
        driver: &mut CycleDriver<S>,
        dut: &mut DutHandle,
        logger: &mut ResultLogger<W>,
    ) -> HarnessResult<SweepSummary>
    where
        S: ClockStepper,
        W: Write,
    {
        self.run_preset_sweep_with(driver, dut, |point| write_point(logger, point))
    }
}

fn write_point<W: Write>(logger: &mut ResultLogger<W>, point: &SweepPoint) -> HarnessResult<()> {
    for sample in &point.samples {
        logger.write(sample)?;
    }
    Ok(())
}

fn log_summary(kind: &str, summary: &SweepSummary) {
    info!(
        "[SWEEP] {} sweep complete: {} points, {} samples, {} cycles, decoded range [{}, {}]",
        kind,
        summary.points,
        summary.samples,
        summary.cycles,
        summary.min.map_or_else(|| "-".to_string(), |v| v.to_string()),
        summary.max.map_or_else(|| "-".to_string(), |v| v.to_string()),
    );
}
