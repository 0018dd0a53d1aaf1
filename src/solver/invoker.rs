//! # Solver invocation
//!
//! [`KinematicSolver`] runs the external executable once per request:
//!
//! 1. the encoded records are staged in `source_file.dat` inside the working directory,
//! 2. the executable is spawned there without arguments,
//! 3. the same records are written on its standard input, which is then closed,
//! 4. standard output and standard error are read to completion and the process is reaped.
//!
//! The exchange is blocking, with no retry and no timeout: a hung executable hangs the
//! caller. The exit status is logged but not interpreted; only the output text matters.
//!
//! ## Working directory
//! -----------------
//! Without a configured [`SolverConfig::work_dir`] every invocation gets its own temporary
//! directory, removed afterwards, so invocations from several threads never share the
//! scratch file. With a pinned directory the caller must serialize invocations.
//!
//! ## Health check
//! -----------------
//! [`KinematicSolver::health_check`] sends a single probe record and checks that one
//! well-formed record comes back. It only runs when called.
use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread,
};

use tracing::{debug, warn};

use crate::{
    catalog::Catalog,
    constants::{Degree, Kpc, SCRATCH_FILE_NAME},
    kdist_errors::KdistError,
};

use super::{
    encoder::encode_catalog,
    parser::parse_solver_output_expecting,
    Encoding, NearFar, ParsedRecord, SolverConfig, SolverRecord,
};

/// Probe record of the revised solver (equatorial input, far side).
pub const REVISED_PROBE: &str = "test    010203.04 121314.5 -10 1\n";

/// Probe record of the universal solver (galactic input, near side).
pub const UNIVERSAL_PROBE: &str = "test    030.00 -01.00 -10 0\n";

/// Reference distance answered by the revised solver to [`REVISED_PROBE`].
pub const REVISED_PROBE_DISTANCE: Kpc = 0.41;

/// Reference distance answered by the universal solver to [`UNIVERSAL_PROBE`].
pub const UNIVERSAL_PROBE_DISTANCE: Kpc = 14.92;

const PROBE_NAME: &str = "test";
const UNIVERSAL_PROBE_POSITION: (Degree, Degree) = (30.0, -1.0);
const PROBE_POSITION_TOLERANCE: Degree = 1e-3;

/// Raw result of one solver run.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Handle on one external kinematic distance executable.
#[derive(Debug, Clone)]
pub struct KinematicSolver {
    config: SolverConfig,
}

impl KinematicSolver {
    pub fn new(config: SolverConfig) -> Self {
        KinematicSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Program path handed to the OS.
    ///
    /// A relative path with several components is anchored on the caller's current
    /// directory, since the child runs in another directory. A bare name is left to `PATH`.
    fn program(&self) -> Result<PathBuf, KdistError> {
        let executable = &self.config.executable;
        if executable.is_relative() && executable.components().count() > 1 {
            Ok(env::current_dir()?.join(executable))
        } else {
            Ok(executable.as_std_path().to_path_buf())
        }
    }

    fn spawn_error(&self, err: io::Error) -> KdistError {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                KdistError::ExecutableNotFound(format!("{}: {err}", self.config.executable))
            }
            _ => KdistError::IoError(err),
        }
    }

    /// Run the executable once with `input` as its records.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: the encoded records, newline terminated.
    ///
    /// Return
    /// ----------
    /// * The complete standard output / error and exit status.
    /// * [`KdistError::ExecutableNotFound`] if the executable cannot be spawned.
    /// * [`KdistError::IoError`] for scratch file or pipe failures.
    pub fn invoke(&self, input: &str) -> Result<SolverOutput, KdistError> {
        match &self.config.work_dir {
            Some(work_dir) => self.invoke_in(work_dir.as_std_path(), input),
            None => {
                let scratch = tempfile::Builder::new().prefix("kdist-").tempdir()?;
                self.invoke_in(scratch.path(), input)
            }
        }
    }

    fn invoke_in(&self, work_dir: &Path, input: &str) -> Result<SolverOutput, KdistError> {
        let program = self.program()?;
        std::fs::write(work_dir.join(SCRATCH_FILE_NAME), input)?;

        debug!(
            executable = %self.config.executable,
            work_dir = %work_dir.display(),
            records = input.lines().count(),
            "invoking kinematic distance solver"
        );

        let mut child = Command::new(&program)
            .current_dir(work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Feed stdin from another thread so a solver writing before reading cannot block us.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output()?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // the solver may read the scratch file and never open stdin
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("solver closed its standard input before reading it")
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    return Err(KdistError::IoError(io::Error::other(
                        "solver stdin writer panicked",
                    )))
                }
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            warn!(
                status = %output.status,
                "kinematic distance solver exited with failure status"
            );
        }
        debug!(
            status = %output.status,
            stdout_lines = stdout.lines().count(),
            stderr_bytes = stderr.len(),
            "kinematic distance solver finished"
        );
        if !stderr.is_empty() {
            debug!(stderr = %stderr.trim_end(), "kinematic distance solver stderr");
        }

        Ok(SolverOutput {
            stdout,
            stderr,
            status: output.status,
        })
    }

    /// Compute one side of the kinematic distance of every catalog row.
    ///
    /// Encodes the catalog in order, runs the solver once and parses its output.
    ///
    /// Return
    /// ----------
    /// * One [`ParsedRecord`] per row, in catalog order. An empty catalog does not spawn the solver.
    /// * [`KdistError::SolverProducedNoOutput`] / [`KdistError::RowCountMismatch`] when the
    ///   solver does not answer every row exactly once.
    pub fn solve_catalog(
        &self,
        catalog: &Catalog,
        nearfar: NearFar,
    ) -> Result<Vec<ParsedRecord>, KdistError> {
        if catalog.is_empty() {
            return Ok(Vec::new());
        }
        let input = encode_catalog(catalog, nearfar, self.config.encoding)?;
        let output = self.invoke(&input)?;
        parse_solver_output_expecting(&output.stdout, catalog.len())
    }

    /// Send the probe record and require a plausible answer to it.
    ///
    /// The answer must be a single well-formed record named `test` with a finite,
    /// non-negative distance. For the universal solver the echoed galactic position must be
    /// the probe position `(30°, -1°)`.
    ///
    /// Return
    /// ----------
    /// * The solver record answering the probe.
    /// * [`KdistError::ExecutableNotFound`] if the executable cannot be spawned.
    /// * [`KdistError::HealthCheckFailed`] if the answer is missing, repeated, malformed or
    ///   does not answer the probe.
    ///
    /// See also
    /// ------------
    /// * [`KinematicSolver::health_check_expecting`] – Also checks the probe distance.
    pub fn health_check(&self) -> Result<SolverRecord, KdistError> {
        let probe = match self.config.encoding {
            Encoding::Equatorial => REVISED_PROBE,
            Encoding::Galactic => UNIVERSAL_PROBE,
        };
        let output = self.invoke(probe)?;
        let parsed = parse_solver_output_expecting(&output.stdout, 1)
            .map_err(|e| KdistError::HealthCheckFailed(e.to_string()))?
            .remove(0);
        if parsed.repaired {
            return Err(KdistError::HealthCheckFailed(format!(
                "probe answer has collided columns: {:?}",
                parsed.record
            )));
        }
        check_probe_answer(&parsed.record, self.config.encoding)?;
        Ok(parsed.record)
    }

    /// [`KinematicSolver::health_check`], also requiring the probe distance to be within
    /// `tolerance` of `expected_d_k`.
    ///
    /// [`REVISED_PROBE_DISTANCE`] and [`UNIVERSAL_PROBE_DISTANCE`] are the reference answers
    /// of the two solver variants.
    pub fn health_check_expecting(
        &self,
        expected_d_k: Kpc,
        tolerance: Kpc,
    ) -> Result<SolverRecord, KdistError> {
        let record = self.health_check()?;
        if (record.d_k - expected_d_k).abs() > tolerance {
            return Err(KdistError::HealthCheckFailed(format!(
                "probe distance {} kpc, expected {expected_d_k} ± {tolerance} kpc",
                record.d_k
            )));
        }
        Ok(record)
    }
}

fn check_probe_answer(record: &SolverRecord, encoding: Encoding) -> Result<(), KdistError> {
    let failed = |reason: String| Err(KdistError::HealthCheckFailed(reason));

    if record.name != PROBE_NAME {
        return failed(format!(
            "probe answered as {:?}, expected {PROBE_NAME:?}",
            record.name
        ));
    }
    if !record.d_k.is_finite() || record.d_k < 0.0 {
        return failed(format!("probe distance {} kpc is not physical", record.d_k));
    }
    if encoding == Encoding::Galactic {
        let (gal_long, gal_lat) = UNIVERSAL_PROBE_POSITION;
        let mismatch = |value: Degree, expected: Degree| {
            value.is_nan() || (value - expected).abs() > PROBE_POSITION_TOLERANCE
        };
        if mismatch(record.gal_long, gal_long) || mismatch(record.gal_lat, gal_lat) {
            return failed(format!(
                "probe position echoed as ({}, {}), expected ({gal_long}, {gal_lat})",
                record.gal_long, record.gal_lat
            ));
        }
    }
    Ok(())
}
