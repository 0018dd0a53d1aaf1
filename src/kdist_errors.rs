use thiserror::Error;

use crate::{constants::StructureId, solver::parser::ParseRecordError, solver::NearFar};

#[derive(Error, Debug)]
pub enum KdistError {
    #[error("Kinematic distance executable cannot be spawned: {0}")]
    ExecutableNotFound(String),

    #[error("Kinematic distance solver produced no records ({expected} expected)")]
    SolverProducedNoOutput { expected: usize },

    #[error("Solver record count mismatch: {expected} rows sent, {found} records received")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("Malformed solver record {line:?}: {reason}")]
    MalformedRecord {
        line: String,
        reason: ParseRecordError,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Structure {0} has no catalog row")]
    MissingCatalogRow(StructureId),

    #[error("Structure id {0} appears more than once")]
    DuplicateStructureId(StructureId),

    #[error("Invalid structure tree: {0}")]
    InvalidStructureTree(String),

    #[error("Structure {id} has no {side} distance to choose from")]
    MissingDistanceSolution { id: StructureId, side: NearFar },

    #[error("Kinematic distance solver health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Catalog CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for KdistError {
    fn eq(&self, other: &Self) -> bool {
        use KdistError::*;
        match (self, other) {
            (ExecutableNotFound(a), ExecutableNotFound(b)) => a == b,
            (
                SolverProducedNoOutput { expected: a },
                SolverProducedNoOutput { expected: b },
            ) => a == b,
            (
                RowCountMismatch {
                    expected: e1,
                    found: f1,
                },
                RowCountMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (
                MalformedRecord {
                    line: l1,
                    reason: r1,
                },
                MalformedRecord {
                    line: l2,
                    reason: r2,
                },
            ) => l1 == l2 && r1 == r2,
            (InvalidArgument(a), InvalidArgument(b)) => a == b,
            (MissingCatalogRow(a), MissingCatalogRow(b)) => a == b,
            (DuplicateStructureId(a), DuplicateStructureId(b)) => a == b,
            (InvalidStructureTree(a), InvalidStructureTree(b)) => a == b,
            (
                MissingDistanceSolution { id: i1, side: s1 },
                MissingDistanceSolution { id: i2, side: s2 },
            ) => i1 == i2 && s1 == s2,
            (HealthCheckFailed(a), HealthCheckFailed(b)) => a == b,

            // io and csv errors are not comparable, same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
