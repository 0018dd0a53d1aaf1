//! # Distance merging and ambiguity resolution
//!
//! Writes solver answers back into the [`Catalog`] and picks, per structure, the side of the
//! kinematic distance ambiguity that becomes the canonical `distance`.
//!
//! ## Workflow
//! -----------------
//! 1. [`assign_near_far_distances`] (or [`assign_distances`] twice) fills the `near_*` and
//!    `far_*` columns, aligning solver records on rows **by position**.
//! 2. The caller builds boolean masks from its own criteria (velocity split, latitude,
//!    absorption features, …).
//! 3. [`choose_nearfar_distance`] is called once per mask to copy the chosen side into the
//!    canonical columns and tag `KDA_resolution`. Disjoint masks partition the catalog.
//!
//! ```rust
//! use kdist::catalog::{Catalog, CatalogRow, DistanceColumn, KdaResolution};
//! use kdist::distance_assigner::{assign_distances, choose_nearfar_distance};
//! use kdist::solver::{parser::parse_solver_output, NearFar};
//!
//! let mut catalog = Catalog::new(vec![
//!     CatalogRow::new(0, 120.0, 0.5, -40.0),
//!     CatalogRow::new(1, 121.0, -0.5, -60.0),
//! ])
//! .unwrap();
//!
//! let near = parse_solver_output(concat!(
//!     "0 120.0  0.5 -40.0 -38.0 2.1 0.3 -0.2\n",
//!     "1 121.0 -0.5 -60.0 -57.0 3.9 0.4 -0.4\n",
//! ))
//! .unwrap();
//! let far = parse_solver_output(concat!(
//!     "0 120.0  0.5 -40.0 -38.0 9.5 0.6 -0.5\n",
//!     "1 121.0 -0.5 -60.0 -57.0 8.1 0.5 -0.5\n",
//! ))
//! .unwrap();
//! assign_distances(&mut catalog, &near, DistanceColumn::Near).unwrap();
//! assign_distances(&mut catalog, &far, DistanceColumn::Far).unwrap();
//!
//! choose_nearfar_distance(&mut catalog, NearFar::Near, &[true, false], false).unwrap();
//! choose_nearfar_distance(&mut catalog, NearFar::Far, &[false, true], false).unwrap();
//!
//! assert_eq!(catalog.rows()[0].distance, Some(2.1));
//! assert_eq!(catalog.rows()[1].kda_resolution, Some(KdaResolution::Far));
//! ```
use tracing::info;

use crate::{
    catalog::{Catalog, DistanceColumn, DistanceSolution, KdaResolution},
    kdist_errors::KdistError,
    solver::{invoker::KinematicSolver, NearFar, ParsedRecord},
};

/// Copy solver records into one set of distance columns, row by row.
///
/// `D_k` becomes the distance and the absolute values of `error_D_k_plus` /
/// `error_D_k_minus` the error bars, whatever sign convention the solver used. The
/// repaired flag of each record is carried along. Applying the same records twice leaves
/// the catalog unchanged.
///
/// Arguments
/// -----------------
/// * `catalog`: the catalog whose rows were sent to the solver, in the same order.
/// * `records`: the parsed solver answer.
/// * `column`: the set of columns to fill.
///
/// Return
/// ----------
/// * [`KdistError::RowCountMismatch`] if `records` does not hold one record per row; the
///   catalog is left untouched.
pub fn assign_distances(
    catalog: &mut Catalog,
    records: &[ParsedRecord],
    column: DistanceColumn,
) -> Result<(), KdistError> {
    if records.len() != catalog.len() {
        return Err(KdistError::RowCountMismatch {
            expected: catalog.len(),
            found: records.len(),
        });
    }

    for (row, parsed) in catalog.rows_mut().iter_mut().zip(records) {
        row.set_solution(
            column,
            DistanceSolution {
                distance: parsed.record.d_k,
                error_plus: parsed.record.error_d_k_plus.abs(),
                error_minus: parsed.record.error_d_k_minus.abs(),
                repaired: parsed.repaired,
            },
        );
    }
    Ok(())
}

/// Resolve the kinematic distance ambiguity for the rows selected by `mask`.
///
/// For every masked row the `near` or `far` solution is copied into the canonical
/// `distance` columns and `KDA_resolution` is set to `N` / `F`, or to `U` when
/// `unambiguous_tag` is set. Unmasked rows are not touched.
///
/// Arguments
/// -----------------
/// * `catalog`: catalog with the chosen side already merged.
/// * `nearfar`: the side to copy.
/// * `mask`: one entry per row, `true` selects the row.
/// * `unambiguous_tag`: tag the rows `U` instead of `N` / `F`.
///
/// Return
/// ----------
/// * [`KdistError::InvalidArgument`] if the mask length differs from the row count.
/// * [`KdistError::MissingDistanceSolution`] if a masked row has no solution on the chosen
///   side. Both checks happen before any row is modified.
pub fn choose_nearfar_distance(
    catalog: &mut Catalog,
    nearfar: NearFar,
    mask: &[bool],
    unambiguous_tag: bool,
) -> Result<(), KdistError> {
    if mask.len() != catalog.len() {
        return Err(KdistError::InvalidArgument(format!(
            "mask has {} entries for {} catalog rows",
            mask.len(),
            catalog.len()
        )));
    }

    let chosen = catalog
        .iter()
        .zip(mask.iter().copied())
        .map(|(row, selected)| match selected {
            false => Ok(None),
            true => row
                .solution(nearfar.column())
                .map(Some)
                .ok_or(KdistError::MissingDistanceSolution {
                    id: row.id,
                    side: nearfar,
                }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tag = if unambiguous_tag {
        KdaResolution::Unambiguous
    } else {
        nearfar.resolution()
    };

    for (row, solution) in catalog.rows_mut().iter_mut().zip(chosen) {
        if let Some(solution) = solution {
            row.set_solution(DistanceColumn::Resolved, solution);
            row.kda_resolution = Some(tag);
        }
    }
    Ok(())
}

/// Run the solver for both sides of the ambiguity and fill the `near_*` and `far_*` columns.
///
/// Both runs complete before the catalog is modified, so a failure of the far run leaves
/// the near columns as they were.
pub fn assign_near_far_distances(
    solver: &KinematicSolver,
    catalog: &mut Catalog,
) -> Result<(), KdistError> {
    info!(
        rows = catalog.len(),
        executable = %solver.config().executable,
        "computing near and far kinematic distances"
    );

    let near = solver.solve_catalog(catalog, NearFar::Near)?;
    let far = solver.solve_catalog(catalog, NearFar::Far)?;

    let repaired = near.iter().chain(&far).filter(|r| r.repaired).count();
    if repaired > 0 {
        info!(repaired, "solver records replaced by placeholders");
    }

    assign_distances(catalog, &near, DistanceColumn::Near)?;
    assign_distances(catalog, &far, DistanceColumn::Far)?;
    Ok(())
}
