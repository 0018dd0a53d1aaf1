//! # External kinematic distance solver
//!
//! The rotation-curve physics lives in an external, opaque executable. This module drives it
//! as a batch text-in / text-out subprocess:
//!
//! ```text
//! Catalog ──encoder──▶ input text ──invoker──▶ stdout ──parser──▶ Vec<ParsedRecord>
//! ```
//!
//! ## Solver variants
//! -----------------
//! Two variants of the executable exist, differing only by how a sky position is written:
//!
//! | variant | [`Encoding`] | position fields |
//! |---------|--------------|-----------------|
//! | revised | [`Encoding::Equatorial`] | `HHMMSS.SS ±DDMMSS.SS` (FK5 J2000) |
//! | universal | [`Encoding::Galactic`] | `lll.lll ±bb.bbb` (degrees) |
//!
//! Both read one record per line (`NAME POS POS VLSR DIRFLAG`) on standard input and print
//! `!` commentary lines interleaved with 8-column data lines, in input order.
//!
//! ## Configuration
//! -----------------
//! The executable path is an explicit [`SolverConfig`] value handed to
//! [`KinematicSolver::new`](crate::solver::invoker::KinematicSolver::new); nothing is discovered
//! on disk implicitly.
//!
//! ```rust
//! use kdist::solver::{Encoding, SolverConfig};
//!
//! let config = SolverConfig::universal("/opt/kdist/universal_sersic_kdist")
//!     .with_work_dir("/tmp/kdist-run");
//! assert_eq!(config.encoding, Encoding::Galactic);
//! ```
//!
//! ## Errors
//! -----------------
//! * [`KdistError::ExecutableNotFound`] – the executable cannot be spawned.
//! * [`KdistError::SolverProducedNoOutput`] / [`KdistError::RowCountMismatch`] – the number of
//!   records received differs from the number of rows sent.
//! * [`KdistError::MalformedRecord`] – a data line cannot be parsed nor repaired.
pub mod encoder;
pub mod invoker;
pub mod parser;

use std::{fmt, str::FromStr};

use camino::Utf8PathBuf;

use crate::{
    catalog::{DistanceColumn, KdaResolution},
    constants::{
        Degree, KmPerSec, Kpc, DEFAULT_REVISED_EXECUTABLE, DEFAULT_UNIVERSAL_EXECUTABLE,
    },
    kdist_errors::KdistError,
};

/// Side of the kinematic distance ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NearFar {
    Near,
    Far,
}

impl NearFar {
    /// Direction flag understood by the solver: `0` near, `1` far.
    pub fn direction_flag(&self) -> u8 {
        match self {
            NearFar::Near => 0,
            NearFar::Far => 1,
        }
    }

    pub fn column(&self) -> DistanceColumn {
        match self {
            NearFar::Near => DistanceColumn::Near,
            NearFar::Far => DistanceColumn::Far,
        }
    }

    pub fn resolution(&self) -> KdaResolution {
        match self {
            NearFar::Near => KdaResolution::Near,
            NearFar::Far => KdaResolution::Far,
        }
    }
}

impl fmt::Display for NearFar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearFar::Near => write!(f, "near"),
            NearFar::Far => write!(f, "far"),
        }
    }
}

impl FromStr for NearFar {
    type Err = KdistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "near" => Ok(NearFar::Near),
            "far" => Ok(NearFar::Far),
            _ => Err(KdistError::InvalidArgument(format!(
                "`nearfar` must be 'near' or 'far', got {s:?}"
            ))),
        }
    }
}

/// How sky positions are written in the solver input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// FK5 J2000 sexagesimal right ascension and declination (revised solver).
    Equatorial,
    /// Galactic longitude and latitude in decimal degrees (universal solver).
    Galactic,
}

/// One data line of the solver output.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverRecord {
    pub name: String,
    pub gal_long: Degree,
    pub gal_lat: Degree,
    pub v_lsr: KmPerSec,
    pub v_rev: KmPerSec,
    pub d_k: Kpc,
    pub error_d_k_plus: Kpc,
    pub error_d_k_minus: Kpc,
}

/// A solver record and whether it was rebuilt from a line with collided columns.
///
/// When `repaired` is `true`, `d_k` and both errors are the `0.00` placeholder and must not
/// be read as a zero-distance solution.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub record: SolverRecord,
    pub repaired: bool,
}

/// Explicit configuration of a [`KinematicSolver`](crate::solver::invoker::KinematicSolver).
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Path (or bare program name resolved through `PATH`) of the executable.
    pub executable: Utf8PathBuf,
    pub encoding: Encoding,
    /// Working directory holding the scratch input file. `None` creates a fresh temporary
    /// directory per invocation, so concurrent invocations never share a scratch file.
    pub work_dir: Option<Utf8PathBuf>,
}

impl SolverConfig {
    /// Revised solver, reading equatorial positions.
    pub fn revised(executable: impl Into<Utf8PathBuf>) -> Self {
        SolverConfig {
            executable: executable.into(),
            encoding: Encoding::Equatorial,
            work_dir: None,
        }
    }

    /// Universal solver, reading galactic positions.
    pub fn universal(executable: impl Into<Utf8PathBuf>) -> Self {
        SolverConfig {
            executable: executable.into(),
            encoding: Encoding::Galactic,
            work_dir: None,
        }
    }

    /// Solver of the given variant, looked up on `PATH` under its default executable name.
    pub fn for_encoding(encoding: Encoding) -> Self {
        SolverConfig {
            executable: encoding.default_executable().into(),
            encoding,
            work_dir: None,
        }
    }

    /// Pin the working directory. Invocations sharing it must be serialized by the caller.
    pub fn with_work_dir(mut self, work_dir: impl Into<Utf8PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }
}

impl Default for SolverConfig {
    /// The revised solver looked up as `revised_kinematic_distance` on `PATH`.
    fn default() -> Self {
        SolverConfig::for_encoding(Encoding::Equatorial)
    }
}

impl Encoding {
    /// Executable name used when only the variant is known.
    pub fn default_executable(&self) -> &'static str {
        match self {
            Encoding::Equatorial => DEFAULT_REVISED_EXECUTABLE,
            Encoding::Galactic => DEFAULT_UNIVERSAL_EXECUTABLE,
        }
    }
}
