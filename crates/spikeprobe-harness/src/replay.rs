// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Coordinate log replay
//!
//! Reads a coordinate result log back and checks it against the sweep
//! enumeration: record `n` must carry the `n`-th `(current, a, b)` triple and
//! cycle indices must strictly increase. A complete log holds exactly
//! 65,280 records; a partial log (interrupted run) must be a clean prefix.

use std::io::BufRead;

use serde::Serialize;

use crate::codec::NIBBLE_MAX;
use crate::error::{HarnessError, HarnessResult};
use crate::logger::LogFormat;
use crate::sweep::{CoordinateTriple, FULL_COORDINATE_POINTS};

/// One parsed body line of a coordinate log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateRecord {
    /// 1-based line number in the file
    pub line: usize,
    pub cycle: u64,
    pub value: f64,
    pub ui_in: u8,
    pub a: u8,
    pub b: u8,
}

/// First problem found while verifying a log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub line: usize,
    pub reason: String,
}

/// Outcome of [`verify_coordinate_order`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub records: usize,
    pub expected: Option<usize>,
    pub first_violation: Option<Violation>,
}

impl ReplayReport {
    pub fn is_ok(&self) -> bool {
        self.first_violation.is_none()
    }

    pub fn into_result(self) -> HarnessResult<Self> {
        match self.first_violation {
            Some(Violation { line, reason }) => Err(HarnessError::Replay { line, reason }),
            None => Ok(self),
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str, line: usize) -> HarnessResult<T> {
    field.parse().map_err(|_| HarnessError::Replay {
        line,
        reason: format!("field '{}' has invalid value '{}'", name, field),
    })
}

/// Parse a coordinate log, rejecting a wrong header or malformed lines
pub fn read_coordinate_log<R: BufRead>(reader: R) -> HarnessResult<Vec<CoordinateRecord>> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(HarnessError::Replay {
                line: 1,
                reason: "empty log, header missing".to_string(),
            })
        }
    };
    let expected_header = LogFormat::Coordinate.header();
    if header.trim() != expected_header {
        return Err(HarnessError::Replay {
            line: 1,
            reason: format!("expected header '{}', found '{}'", expected_header, header.trim()),
        });
    }

    let mut records = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line_number = offset + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(HarnessError::Replay {
                line: line_number,
                reason: format!("expected 5 fields, found {}", fields.len()),
            });
        }

        let record = CoordinateRecord {
            line: line_number,
            cycle: parse_field(fields[0], "clk", line_number)?,
            value: parse_field(fields[1], "uo_out", line_number)?,
            ui_in: parse_field(fields[2], "ui_in", line_number)?,
            a: parse_field(fields[3], "a", line_number)?,
            b: parse_field(fields[4], "b", line_number)?,
        };
        if record.a > NIBBLE_MAX || record.b > NIBBLE_MAX {
            return Err(HarnessError::Replay {
                line: line_number,
                reason: format!("coordinate ({}, {}) does not fit in 4 bits", record.a, record.b),
            });
        }
        records.push(record);
    }
    Ok(records)
}

/// Check sweep ordering, uniqueness and (optionally) completeness
///
/// `expected` is the record count of a finished run, usually
/// [`FULL_COORDINATE_POINTS`]; `None` accepts any clean prefix.
pub fn verify_coordinate_order(records: &[CoordinateRecord], expected: Option<usize>) -> ReplayReport {
    let mut report = ReplayReport {
        records: records.len(),
        expected,
        first_violation: None,
    };

    let mut previous_cycle: Option<u64> = None;
    for (ordinal, record) in records.iter().enumerate() {
        let violation = match CoordinateTriple::from_ordinal(ordinal) {
            None => Some(format!(
                "record {} is past the end of a {}-point sweep",
                ordinal, FULL_COORDINATE_POINTS
            )),
            Some(triple)
                if (triple.current, triple.coordinate.a(), triple.coordinate.b())
                    != (record.ui_in, record.a, record.b) =>
            {
                Some(format!(
                    "expected ({}, {}, {}), found ({}, {}, {})",
                    triple.current,
                    triple.coordinate.a(),
                    triple.coordinate.b(),
                    record.ui_in,
                    record.a,
                    record.b
                ))
            }
            Some(_) if previous_cycle.is_some_and(|prev| record.cycle <= prev) => Some(format!(
                "cycle {} does not follow cycle {}",
                record.cycle,
                previous_cycle.unwrap_or_default()
            )),
            Some(_) => None,
        };

        if let Some(reason) = violation {
            report.first_violation = Some(Violation {
                line: record.line,
                reason,
            });
            return report;
        }
        previous_cycle = Some(record.cycle);
    }

    if let Some(expected) = expected {
        if records.len() != expected {
            report.first_violation = Some(Violation {
                line: records.last().map_or(1, |r| r.line),
                reason: format!("expected {} records, found {}", expected, records.len()),
            });
        }
    }
    report
}
