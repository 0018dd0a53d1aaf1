//! # kdist
//!
//! Kinematic distances for the structures of a position-position-velocity dendrogram.
//!
//! ## Overview
//! -----------------
//! - [`velocity_split`] – velocity separation at every dendrogram merger.
//! - [`solver`] – encoding, invocation and output parsing of the external kinematic
//!   distance executable (revised/equatorial and universal/galactic variants).
//! - [`distance_assigner`] – merging of near/far solutions into the [`Catalog`] and
//!   mask-driven resolution of the kinematic distance ambiguity.
//! - [`dendrogram`], [`catalog`] – the data exchanged with the upstream decomposition.
//!
//! ## Typical usage
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use kdist::{
//!     assign_near_far_distances, choose_nearfar_distance, Catalog, KinematicSolver, NearFar,
//!     SolverConfig,
//! };
//!
//! let mut catalog = Catalog::from_csv_path(Utf8Path::new("catalog.csv")).unwrap();
//! let solver = KinematicSolver::new(SolverConfig::universal("/opt/kdist/universal_sersic_kdist"));
//! solver.health_check().unwrap();
//!
//! assign_near_far_distances(&solver, &mut catalog).unwrap();
//!
//! let nearside: Vec<bool> = catalog.iter().map(|row| row.y_cen.abs() > 1.0).collect();
//! let farside: Vec<bool> = nearside.iter().map(|near| !near).collect();
//! choose_nearfar_distance(&mut catalog, NearFar::Near, &nearside, false).unwrap();
//! choose_nearfar_distance(&mut catalog, NearFar::Far, &farside, false).unwrap();
//!
//! catalog.write_csv(std::io::stdout()).unwrap();
//! ```
pub mod catalog;
pub mod constants;
mod conversion;
pub mod dendrogram;
pub mod distance_assigner;
pub mod kdist_errors;
pub mod ref_system;
pub mod solver;
pub mod velocity_split;

pub use catalog::{Catalog, CatalogRow, DistanceColumn, DistanceSolution, KdaResolution};
pub use constants::{Degree, KmPerSec, Kpc, StructureId};
pub use dendrogram::{Dendrogram, DendrogramBuilder, StructureNode};
pub use distance_assigner::{assign_distances, assign_near_far_distances, choose_nearfar_distance};
pub use kdist_errors::KdistError;
pub use solver::{
    invoker::{KinematicSolver, SolverOutput},
    Encoding, NearFar, ParsedRecord, SolverConfig, SolverRecord,
};
pub use velocity_split::{calculate_velocity_split, VelocitySplit};
