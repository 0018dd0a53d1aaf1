//! # Constants and type definitions for kdist
//!
//! This module centralizes the **unit aliases**, **frame constants**, and **protocol
//! constants** shared by the dendrogram traversal, the solver protocol, and the
//! catalog merger.
//!
//! ## Overview
//!
//! - Unit aliases (degrees, km/s, kpc) used to document every numeric field
//! - Structure identifiers shared by the dendrogram and the catalog
//! - Orientation of the galactic frame with respect to FK5 J2000
//! - Fixed values of the external solver protocol (scratch file, comment marker, column count)

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Degrees → hours of right ascension
pub const DEG_TO_HOURS: f64 = 1.0 / 15.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Line-of-sight velocity in km/s
pub type KmPerSec = f64;
/// Distance in kiloparsecs
pub type Kpc = f64;

/// Identifier of a dendrogram structure, shared by the tree and the catalog (`_idx` column).
pub type StructureId = u32;

// -------------------------------------------------------------------------------------------------
// Galactic frame
// -------------------------------------------------------------------------------------------------

/// Rotation matrix from FK5 J2000 equatorial to galactic cartesian coordinates,
/// row major (Hipparcos definition of the galactic pole and origin).
///
/// A galactic unit vector `g` maps back to equatorial coordinates with the transpose.
pub const EQUATORIAL_TO_GALACTIC: [[f64; 3]; 3] = [
    [-0.054_875_560_416_215_4, -0.873_437_090_234_885, -0.483_835_015_548_713_2],
    [0.494_109_427_875_583_7, -0.444_829_629_960_011_2, 0.746_982_244_497_218_9],
    [-0.867_666_149_019_004_7, -0.198_076_373_431_201_5, 0.455_983_776_175_066_9],
];

// -------------------------------------------------------------------------------------------------
// External solver protocol
// -------------------------------------------------------------------------------------------------

/// Name of the scratch file the encoded records are staged into, inside the solver working directory.
pub const SCRATCH_FILE_NAME: &str = "source_file.dat";

/// Any output line containing this marker is solver commentary.
pub const COMMENT_MARKER: char = '!';

/// Number of whitespace separated columns in a well-formed solver output line.
pub const SOLVER_COLUMNS: usize = 8;

/// Number of leading columns kept verbatim when a line with collided columns is repaired.
pub const REPAIRED_KEPT_COLUMNS: usize = 5;

/// Placeholder (`0.00`) written in the distance fields of a repaired line.
pub const REPAIRED_DISTANCE: Kpc = 0.0;

/// Default executable name of the revised (equatorial input) solver.
pub const DEFAULT_REVISED_EXECUTABLE: &str = "revised_kinematic_distance";

/// Default executable name of the universal (galactic input) solver.
pub const DEFAULT_UNIVERSAL_EXECUTABLE: &str = "universal_sersic_kdist";
