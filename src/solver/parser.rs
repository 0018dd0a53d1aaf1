//! # Solver output parsing and sanitizing
//!
//! The solver prints commentary lines (containing `!`) interleaved with fixed-width data
//! lines of 8 columns:
//!
//! ```text
//! ! Source     Gal Long  Gal Lat    V_lsr     V_rev    Rev. D_k     +/-
//! !              (deg)    (deg)    (km/s)    (km/s)     (kpc)      (kpc)
//!   12          30.000   -1.000    -10.0      -8.3     14.92    0.51   -0.47
//! ```
//!
//! | column | field | unit |
//! |--------|-------|------|
//! | 1 | `Source` (`name`) | – |
//! | 2 | `gal_long` | deg |
//! | 3 | `gal_lat` | deg |
//! | 4 | `V_lsr` | km/s |
//! | 5 | `V_rev` | km/s |
//! | 6 | `D_k` | kpc |
//! | 7 | `error_D_k_plus` | kpc |
//! | 8 | `error_D_k_minus` | kpc |
//!
//! ## Column collisions
//! -----------------
//! When two numeric fields reach their fixed width the solver prints them without a
//! separating blank, and the line no longer splits into 8 tokens. The distance fields are
//! the ones known to collide and cannot be told apart, so such a line is rebuilt from its
//! first 5 tokens with `0.00` in the three distance fields and flagged as
//! [`ParsedRecord::repaired`]. When the collision already happens among the first 5 tokens
//! (e.g. `V_lsr` and `V_rev` printed as `-105.2-103.1`), the unreadable field and the
//! kinematic fields after it are NaN; the record is still kept so the run goes on. A line
//! with fewer than 5 tokens cannot be realigned and is a [`KdistError::MalformedRecord`].
use nom::{
    bytes::complete::take_till1,
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, eof, map},
    number::complete::double,
    sequence::{preceded, terminated},
    IResult, Parser,
};
use thiserror::Error;
use tracing::warn;

use crate::{
    constants::{COMMENT_MARKER, REPAIRED_DISTANCE, REPAIRED_KEPT_COLUMNS, SOLVER_COLUMNS},
    kdist_errors::KdistError,
};

use super::{ParsedRecord, SolverRecord};

/// Line-level parsing errors of solver output.
///
/// Variants
/// -----------------
/// * `TooFewColumns` – Fewer than 5 tokens: the record cannot be realigned; payload is the token count.
/// * `InvalidField` – A field is not a number; payload carries the nom diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseRecordError {
    #[error("only {0} columns, the first 5 are needed to realign the record")]
    TooFewColumns(usize),
    #[error("invalid field: {0}")]
    InvalidField(String),
}

fn parse_name(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace).parse(input)
}

fn parse_field(input: &str) -> IResult<&str, f64> {
    preceded(multispace1, double).parse(input)
}

fn parse_record(input: &str) -> IResult<&str, SolverRecord> {
    map(
        terminated(
            (
                preceded(multispace0, parse_name),
                parse_field,
                parse_field,
                parse_field,
                parse_field,
                parse_field,
                parse_field,
                parse_field,
            ),
            (multispace0, eof),
        ),
        |(name, gal_long, gal_lat, v_lsr, v_rev, d_k, plus, minus)| SolverRecord {
            name: name.to_string(),
            gal_long,
            gal_lat,
            v_lsr,
            v_rev,
            d_k,
            error_d_k_plus: plus,
            error_d_k_minus: minus,
        },
    )
    .parse(input)
}

/// Parse a whole token as a number, `None` if anything is left over.
fn parse_number(token: &str) -> Option<f64> {
    let result: IResult<&str, f64> = all_consuming(double).parse(token);
    result.ok().map(|(_, value)| value)
}

/// Rebuild a record from a line with collided columns.
///
/// The first 5 tokens are kept and the distance fields get the placeholder. Once a kept
/// token is not a number (two kinematic columns ran together) the following fields are
/// shifted, so that field and every later kinematic field become NaN.
fn repair_record(tokens: &[&str]) -> (SolverRecord, bool) {
    let kinematic: Vec<f64> = tokens[1..REPAIRED_KEPT_COLUMNS]
        .iter()
        .scan(true, |aligned, token| {
            let value = if *aligned { parse_number(token) } else { None };
            *aligned = value.is_some();
            Some(value.unwrap_or(f64::NAN))
        })
        .collect();
    let aligned = kinematic.iter().all(|v| !v.is_nan());

    let record = SolverRecord {
        name: tokens[0].to_string(),
        gal_long: kinematic[0],
        gal_lat: kinematic[1],
        v_lsr: kinematic[2],
        v_rev: kinematic[3],
        d_k: REPAIRED_DISTANCE,
        error_d_k_plus: REPAIRED_DISTANCE,
        error_d_k_minus: REPAIRED_DISTANCE,
    };
    (record, aligned)
}

/// `true` for lines carrying solver data, i.e. neither blank nor commentary.
fn is_data_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.contains(COMMENT_MARKER)
}

/// Parse one data line, repairing collided columns.
///
/// Return
/// ----------
/// * The record, `repaired` when the line did not split into 8 columns. A repaired record
///   never fails: unreadable kinematic fields are NaN.
/// * [`KdistError::MalformedRecord`] for fewer than 5 columns, or an 8-column line with a
///   field that is not a number.
pub fn parse_data_line(line: &str) -> Result<ParsedRecord, KdistError> {
    let malformed = |reason| KdistError::MalformedRecord {
        line: line.to_string(),
        reason,
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.len() {
        SOLVER_COLUMNS => {
            let (_, record) = parse_record(line)
                .map_err(|e| malformed(ParseRecordError::InvalidField(e.to_string())))?;
            Ok(ParsedRecord {
                record,
                repaired: false,
            })
        }
        n if n >= REPAIRED_KEPT_COLUMNS => {
            let (record, aligned) = repair_record(&tokens);
            if aligned {
                warn!(
                    line,
                    columns = n,
                    "solver line has collided columns, distance replaced by placeholder"
                );
            } else {
                warn!(
                    line,
                    columns = n,
                    "solver line has collided kinematic columns, unreadable fields set to NaN"
                );
            }
            Ok(ParsedRecord {
                record,
                repaired: true,
            })
        }
        n => Err(malformed(ParseRecordError::TooFewColumns(n))),
    }
}

/// Parse the raw standard output of the solver.
///
/// Arguments
/// -----------------
/// * `output`: the complete solver standard output.
///
/// Return
/// ----------
/// * One [`ParsedRecord`] per data line, in emission order. Blank lines and lines containing
///   `!` anywhere are discarded.
/// * [`KdistError::MalformedRecord`] if a data line can be neither parsed nor repaired.
pub fn parse_solver_output(output: &str) -> Result<Vec<ParsedRecord>, KdistError> {
    output
        .lines()
        .filter(|line| is_data_line(line))
        .map(parse_data_line)
        .collect()
}

/// Check that `found` records answer `expected` rows.
///
/// Return
/// ----------
/// * [`KdistError::SolverProducedNoOutput`] if nothing came back for a non-empty request.
/// * [`KdistError::RowCountMismatch`] for any other difference.
pub fn check_record_count(expected: usize, found: usize) -> Result<(), KdistError> {
    match (expected, found) {
        (e, 0) if e > 0 => Err(KdistError::SolverProducedNoOutput { expected }),
        (e, f) if e != f => Err(KdistError::RowCountMismatch { expected, found }),
        _ => Ok(()),
    }
}

/// Parse the solver output and require exactly `expected` records.
///
/// See also
/// ------------
/// * [`parse_solver_output`] – Line filtering and repair.
/// * [`check_record_count`] – Count policy.
pub fn parse_solver_output_expecting(
    output: &str,
    expected: usize,
) -> Result<Vec<ParsedRecord>, KdistError> {
    let records = parse_solver_output(output)?;
    check_record_count(expected, records.len())?;
    Ok(records)
}

#[cfg(test)]
mod parser_test {
    use super::*;

    const HEADER: &str = "! Source     Gal Long  Gal Lat    V_lsr     V_rev    Rev. D_k     +/-\n\
                          !              (deg)    (deg)    (km/s)    (km/s)     (kpc)      (kpc)\n";

    #[test]
    fn test_well_formed_line() {
        let line = "  12      30.000   -1.000    -10.0      -8.3     14.92    0.51   -0.47";
        let parsed = parse_data_line(line).unwrap();
        assert!(!parsed.repaired);
        assert_eq!(
            parsed.record,
            SolverRecord {
                name: "12".into(),
                gal_long: 30.0,
                gal_lat: -1.0,
                v_lsr: -10.0,
                v_rev: -8.3,
                d_k: 14.92,
                error_d_k_plus: 0.51,
                error_d_k_minus: -0.47,
            }
        );
    }

    #[test]
    fn test_comments_and_blank_lines_are_dropped() {
        let output = format!(
            "{HEADER}\n  1   120.000  0.500  -40.0  -38.0   2.10  0.30  0.25\n   \n\
             ! end of run\n  2   121.000 -0.500  -60.0  -57.1   4.00  0.40  0.35 ! trailing note\n"
        );
        let records = parse_solver_output(&output).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.name, "1");
        assert_eq!(records[0].record.d_k, 2.10);
    }

    #[test]
    fn test_collided_columns_are_repaired() {
        // distance and its +error ran together
        let parsed =
            parse_data_line("  7   150.250  1.250  -95.5  -91.2  12.345-0.61  0.58").unwrap();
        assert!(parsed.repaired);
        assert_eq!(parsed.record.name, "7");
        assert_eq!(parsed.record.gal_long, 150.25);
        assert_eq!(parsed.record.v_rev, -91.2);
        assert_eq!(parsed.record.d_k, 0.0);
        assert_eq!(parsed.record.error_d_k_plus, 0.0);
        assert_eq!(parsed.record.error_d_k_minus, 0.0);
    }

    #[test]
    fn test_five_token_line_is_repaired() {
        let parsed = parse_data_line("test 030.00 -01.00 -10 0").unwrap();
        assert!(parsed.repaired);
        assert_eq!(parsed.record.v_lsr, -10.0);
        assert_eq!(parsed.record.d_k, 0.0);
    }

    #[test]
    fn test_collision_in_velocity_columns_is_repaired() {
        let parsed = parse_data_line("  0 120.5 0.25 -105.2-103.1 2.10 0.30 -0.30").unwrap();
        assert!(parsed.repaired);
        assert_eq!(parsed.record.name, "0");
        assert_eq!(parsed.record.gal_long, 120.5);
        assert_eq!(parsed.record.gal_lat, 0.25);
        assert!(parsed.record.v_lsr.is_nan());
        // the next token is the shifted distance, not V_rev
        assert!(parsed.record.v_rev.is_nan());
        assert_eq!(parsed.record.d_k, 0.0);
        assert_eq!(parsed.record.error_d_k_plus, 0.0);
        assert_eq!(parsed.record.error_d_k_minus, 0.0);
    }

    #[test]
    fn test_velocity_collision_keeps_the_run() {
        let output = "  0 120.5 0.25 -105.2-103.1 2.10 0.30 -0.30\n\
                      1 121.0 -0.75 -60.0 -58.1 4.25 0.30 -0.30\n";
        let records = parse_solver_output_expecting(output, 2).unwrap();
        assert!(records[0].repaired);
        assert!(!records[1].repaired);
        assert_eq!(records[1].record.name, "1");
        assert_eq!(records[1].record.d_k, 4.25);
    }

    #[test]
    fn test_genuine_zero_distance_is_not_flagged() {
        let parsed = parse_data_line("5 10.0 0.0 0.0 0.0 0.00 0.00 0.00").unwrap();
        assert!(!parsed.repaired);
        assert_eq!(parsed.record.d_k, 0.0);
    }

    #[test]
    fn test_unrepairable_lines() {
        assert_eq!(
            parse_data_line("1 2.0 3.0"),
            Err(KdistError::MalformedRecord {
                line: "1 2.0 3.0".into(),
                reason: ParseRecordError::TooFewColumns(3),
            })
        );
        assert!(matches!(
            parse_data_line("1 abc 0.0 -10.0 0.0 1.0 0.1 0.1"),
            Err(KdistError::MalformedRecord {
                reason: ParseRecordError::InvalidField(_),
                ..
            })
        ));
    }

    #[test]
    fn test_record_count_policy() {
        assert_eq!(check_record_count(3, 3), Ok(()));
        assert_eq!(check_record_count(0, 0), Ok(()));
        assert_eq!(
            check_record_count(3, 0),
            Err(KdistError::SolverProducedNoOutput { expected: 3 })
        );
        assert_eq!(
            check_record_count(3, 2),
            Err(KdistError::RowCountMismatch {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            check_record_count(0, 1),
            Err(KdistError::RowCountMismatch {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn test_only_commentary_yields_no_output() {
        assert_eq!(
            parse_solver_output_expecting(HEADER, 2),
            Err(KdistError::SolverProducedNoOutput { expected: 2 })
        );
    }
}
