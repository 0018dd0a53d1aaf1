#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard};

use approx::assert_relative_eq;
use camino::Utf8PathBuf;
use kdist::catalog::{Catalog, CatalogRow, DistanceSolution};
use kdist::dendrogram::{Dendrogram, DendrogramBuilder};
use tempfile::TempDir;

/// Two leaves (-5 and +5 km/s) merging into structure 3.
pub fn merger_fixture() -> (Dendrogram, Catalog) {
    let dendrogram = DendrogramBuilder::new()
        .trunk(3)
        .child(1, 3)
        .child(2, 3)
        .build()
        .unwrap();
    let catalog = Catalog::new(vec![
        CatalogRow::new(1, 120.0, 0.0, -5.0),
        CatalogRow::new(2, 120.0, 0.0, 5.0),
        CatalogRow::new(3, 120.0, 0.0, 0.0),
    ])
    .unwrap();
    (dendrogram, catalog)
}

/// A small catalog of outer Galaxy structures.
pub fn outer_galaxy_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogRow::new(0, 120.50, 0.25, -45.2).with_shape(1.5, 0.05, 0.02, 0.03),
        CatalogRow::new(1, 121.00, -0.75, -60.0).with_shape(2.5, 0.08, 0.04, 0.06),
        CatalogRow::new(2, 135.25, 1.10, -30.4).with_shape(0.9, 0.03, 0.02, 0.02),
        CatalogRow::new(3, 30.00, -1.00, 95.0).with_shape(3.1, 0.12, 0.07, 0.09),
    ])
    .unwrap()
}

pub fn assert_solution_close(actual: &DistanceSolution, expected: &DistanceSolution) {
    assert_relative_eq!(actual.distance, expected.distance, epsilon = 1e-9);
    assert_relative_eq!(actual.error_plus, expected.error_plus, epsilon = 1e-9);
    assert_relative_eq!(actual.error_minus, expected.error_minus, epsilon = 1e-9);
    assert_eq!(actual.repaired, expected.repaired);
}

/// Header printed by the fake solvers, as the real executables do.
pub const SOLVER_HEADER: &str =
    "! Source     Gal Long  Gal Lat    V_lsr     V_rev    Rev. D_k     +/-";

/// Answers every input record: near side at 1.50 kpc, far side at 9.50 kpc, with a
/// negative minus error.
pub const ECHO_SOLVER: &str = r#"#!/bin/sh
echo "! Source     Gal Long  Gal Lat    V_lsr     V_rev    Rev. D_k     +/-"
echo "!              (deg)    (deg)    (km/s)    (km/s)     (kpc)      (kpc)"
awk '{ d = ($5 == 1) ? 9.50 : 1.50; printf "%s %9.3f %8.3f %7.1f %7.1f %6.2f %5.2f %6.2f\n", $1, $2, $3, $4, $4 + 1.0, d, 0.30, -0.20 }'
"#;

/// Same answers, read from the scratch file instead of standard input.
pub const SCRATCH_FILE_SOLVER: &str = r#"#!/bin/sh
echo "! reading source_file.dat"
awk '{ d = ($5 == 1) ? 9.50 : 1.50; printf "%s %9.3f %8.3f %7.1f %7.1f %6.2f %5.2f %6.2f\n", $1, $2, $3, $4, $4 + 1.0, d, 0.30, -0.20 }' source_file.dat
"#;

/// Runs the distance and its error together on the second record only.
pub const COLLIDING_SOLVER: &str = r#"#!/bin/sh
awk 'NR == 2 { printf "%s %9.3f %8.3f %7.1f %7.1f 12.345-0.61  0.58\n", $1, $2, $3, $4, $4; next }
     { printf "%s %9.3f %8.3f %7.1f %7.1f %6.2f %5.2f %6.2f\n", $1, $2, $3, $4, $4, 3.25, 0.40, 0.35 }'
"#;

/// Drops the first record.
pub const LOSSY_SOLVER: &str = r#"#!/bin/sh
awk 'NR > 1 { printf "%s %9.3f %8.3f %7.1f %7.1f %6.2f %5.2f %6.2f\n", $1, $2, $3, $4, $4, 3.25, 0.40, 0.35 }'
"#;

/// Prints commentary only and fails.
pub const SILENT_SOLVER: &str = r#"#!/bin/sh
cat > /dev/null
echo "! no rotation curve available" >&2
echo "! nothing computed"
exit 3
"#;

static SOLVER_LOCK: Mutex<()> = Mutex::new(());

/// Serializes script creation and spawning inside one test binary.
///
/// Writing an executable while another thread forks can make the exec fail with
/// `ETXTBSY`; every test running fake solvers holds this guard.
pub fn solver_lock() -> MutexGuard<'static, ()> {
    SOLVER_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An executable shell script living in its own temporary directory.
pub struct FakeSolver {
    pub dir: TempDir,
    pub path: Utf8PathBuf,
}

#[cfg(unix)]
impl FakeSolver {
    pub fn new(script: &str) -> FakeSolver {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("fake_kdist")).unwrap();
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        FakeSolver { dir, path }
    }
}
