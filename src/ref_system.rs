use nalgebra::{Matrix3, Vector3};

use crate::constants::{Degree, Radian, EQUATORIAL_TO_GALACTIC, RADEG};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefSystem {
    // Galactic coordinates (l, b), IAU 1958 definition tied to FK5 J2000
    Galactic,
    // Equatorial mean coordinates at J2000 (FK5)
    EquatorialJ2000,
}

/// Rotation matrix transforming cartesian unit vectors from `ref_sys1` to `ref_sys2`.
///
/// Arguments
/// ---------
/// * `ref_sys1`: source reference system.
/// * `ref_sys2`: target reference system.
///
/// Returns
/// --------
/// * The matrix `rot` such that `x₂ = rot · x₁`. Identity when both systems are equal.
pub fn rotation_between(ref_sys1: &RefSystem, ref_sys2: &RefSystem) -> Matrix3<f64> {
    let eq_to_gal = Matrix3::from_row_slice(&EQUATORIAL_TO_GALACTIC.concat());
    match (ref_sys1, ref_sys2) {
        (RefSystem::EquatorialJ2000, RefSystem::Galactic) => eq_to_gal,
        (RefSystem::Galactic, RefSystem::EquatorialJ2000) => eq_to_gal.transpose(),
        _ => Matrix3::identity(),
    }
}

/// Unit vector pointing at the spherical coordinates `(lon, lat)` given in radians.
fn spherical_to_unit(lon: Radian, lat: Radian) -> Vector3<f64> {
    Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Spherical coordinates (radians) of a vector, longitude wrapped into `[0, 2π)`.
fn unit_to_spherical(v: &Vector3<f64>) -> (Radian, Radian) {
    let lon = v.y.atan2(v.x).rem_euclid(std::f64::consts::TAU);
    let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
    (lon, lat)
}

/// Convert galactic longitude/latitude into FK5 J2000 right ascension/declination.
///
/// Arguments
/// ---------
/// * `gal_long`: galactic longitude in degrees.
/// * `gal_lat`: galactic latitude in degrees.
///
/// Returns
/// --------
/// * `(ra, dec)` in degrees, `ra` in `[0, 360)`.
pub fn galactic_to_equatorial(gal_long: Degree, gal_lat: Degree) -> (Degree, Degree) {
    let rot = rotation_between(&RefSystem::Galactic, &RefSystem::EquatorialJ2000);
    let equ = rot * spherical_to_unit(gal_long * RADEG, gal_lat * RADEG);
    let (ra, dec) = unit_to_spherical(&equ);
    (ra / RADEG, dec / RADEG)
}
