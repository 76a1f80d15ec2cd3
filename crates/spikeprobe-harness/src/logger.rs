// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Result log sink
//!
//! Plain-text, whitespace-separated, one record per line, header first:
//!
//! ```text
//! coordinate:  clk uo_out ui_in a b
//!              <cycle> <decoded> <ui_in> <a> <b>
//!
//! preset:      clk preset name ui_in uo_out
//!              <cycle> <preset_index> <preset_name> <ui_in> <decoded>
//! ```
//!
//! Every record is flushed as soon as it is written and the sink is flushed
//! again on drop, so a run that stops early leaves a file whose last line is
//! complete.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec::ParameterEncoding;
use crate::driver::Sample;
use crate::presets::firing_mode;

/// Record layout of a result log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Coordinate,
    Preset,
}

impl LogFormat {
    pub fn header(self) -> &'static str {
        match self {
            LogFormat::Coordinate => "clk uo_out ui_in a b",
            LogFormat::Preset => "clk preset name ui_in uo_out",
        }
    }
}

/// Scoped writer for one sweep's result log
pub struct ResultLogger<W: Write = BufWriter<File>> {
    writer: Option<W>,
    format: LogFormat,
    records: usize,
    path: Option<PathBuf>,
}

impl ResultLogger<BufWriter<File>> {
    /// Create (truncate) `path` and write the header
    pub fn open(path: impl AsRef<Path>, format: LogFormat) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut logger = Self::from_writer(BufWriter::new(file), format)?;
        logger.path = Some(path.to_path_buf());
        debug!("[LOG] Opened {:?} result log at {}", format, path.display());
        Ok(logger)
    }
}

impl<W: Write> ResultLogger<W> {
    /// Wrap an arbitrary sink and write the header
    pub fn from_writer(mut writer: W, format: LogFormat) -> io::Result<Self> {
        writeln!(writer, "{}", format.header())?;
        writer.flush()?;
        Ok(Self {
            writer: Some(writer),
            format,
            records: 0,
            path: None,
        })
    }

    /// Append one record and flush it
    pub fn write(&mut self, sample: &Sample) -> io::Result<()> {
        let line = self.format_record(sample)?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "result log already closed"))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        self.records += 1;
        Ok(())
    }

    fn format_record(&self, sample: &Sample) -> io::Result<String> {
        match (self.format, sample.parameter) {
            (LogFormat::Coordinate, ParameterEncoding::Coordinate(coordinate)) => Ok(format!(
                "{} {} {} {} {}",
                sample.cycle,
                sample.value,
                sample.ui_in,
                coordinate.a(),
                coordinate.b()
            )),
            (LogFormat::Preset, ParameterEncoding::Preset { index }) => {
                let mode = firing_mode(index as usize).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("preset index {} has no firing mode", index),
                    )
                })?;
                Ok(format!(
                    "{} {} {} {} {}",
                    sample.cycle, index, mode.name, sample.ui_in, sample.value
                ))
            }
            (format, parameter) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} log cannot record a {:?} sample", format, parameter),
            )),
        }
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and release the sink, returning it
    pub fn close(mut self) -> io::Result<W> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "result log already closed"))?;
        writer.flush()?;
        debug!("[LOG] Closed result log after {} records", self.records);
        Ok(writer)
    }
}

impl<W: Write> Drop for ResultLogger<W> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!("[LOG] Failed to flush result log on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DecodePolicy, ParameterCoordinate};

    fn coordinate_sample(cycle: u64, ui_in: u8, a: u8, b: u8, raw: u8) -> Sample {
        Sample {
            cycle,
            ui_in,
            parameter: ParameterEncoding::Coordinate(ParameterCoordinate::new(a, b).unwrap()),
            raw,
            value: DecodePolicy::SignedInteger.decode(raw),
        }
    }

    #[test]
    fn test_coordinate_lines() {
        let mut logger = ResultLogger::from_writer(Vec::new(), LogFormat::Coordinate).unwrap();
        logger.write(&coordinate_sample(2, 0, 0, 1, 0xBF)).unwrap();
        logger.write(&coordinate_sample(4, 7, 10, 15, 12)).unwrap();
        assert_eq!(logger.records_written(), 2);

        let text = String::from_utf8(logger.close().unwrap()).unwrap();
        assert_eq!(text, "clk uo_out ui_in a b\n2 -65 0 0 1\n4 12 7 10 15\n");
    }

    #[test]
    fn test_preset_lines_carry_name() {
        let mut logger = ResultLogger::from_writer(Vec::new(), LogFormat::Preset).unwrap();
        let sample = Sample {
            cycle: 9,
            ui_in: 255,
            parameter: ParameterEncoding::preset(6).unwrap(),
            raw: 0x21,
            value: DecodePolicy::SignedFixedPoint.decode(0x21),
        };
        logger.write(&sample).unwrap();

        let text = String::from_utf8(logger.close().unwrap()).unwrap();
        assert_eq!(text, "clk preset name ui_in uo_out\n9 6 LTS 255 51.5625\n");
    }

    #[test]
    fn test_mode_mismatch_is_rejected() {
        let mut logger = ResultLogger::from_writer(Vec::new(), LogFormat::Preset).unwrap();
        let err = logger.write(&coordinate_sample(1, 0, 0, 0, 0)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(logger.records_written(), 0);
    }

    #[test]
    fn test_file_is_complete_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.log");
        {
            let mut logger = ResultLogger::open(&path, LogFormat::Coordinate).unwrap();
            assert_eq!(logger.path(), Some(path.as_path()));
            logger.write(&coordinate_sample(2, 1, 2, 3, 4)).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), ["clk uo_out ui_in a b", "2 4 1 2 3"]);
    }
}
