//! # Velocity split of dendrogram mergers
//!
//! For every structure of a [`Dendrogram`], the **velocity split** measures how far apart in
//! velocity the lineages joining at that structure are. It is one of the criteria a caller
//! can use to decide which side of the kinematic distance ambiguity a structure belongs to.
//!
//! ## Convention
//! -----------------
//! - Leaves and nodes with a single child: `0`.
//! - Merger (two or more children): the spread of the children central velocities,
//!   `max(v_cen) − min(v_cen)`. For a binary merger this is `|v_cen(c₁) − v_cen(c₂)|`.
//!
//! The split is recorded on the **merger itself**, not on its children.
//!
//! ## Example
//! -----------------
//! ```rust
//! use kdist::catalog::{Catalog, CatalogRow};
//! use kdist::dendrogram::DendrogramBuilder;
//! use kdist::velocity_split::calculate_velocity_split;
//!
//! let dendrogram = DendrogramBuilder::new().trunk(3).child(1, 3).child(2, 3).build().unwrap();
//! let catalog = Catalog::new(vec![
//!     CatalogRow::new(1, 120.0, 0.0, -5.0),
//!     CatalogRow::new(2, 120.0, 0.0, 5.0),
//!     CatalogRow::new(3, 120.0, 0.0, 0.0),
//! ])
//! .unwrap();
//!
//! let split = calculate_velocity_split(&dendrogram, &catalog).unwrap();
//! assert_eq!(split.in_catalog_order(&catalog), Some(vec![0.0, 0.0, 10.0]));
//! ```
use std::collections::BTreeMap;

use itertools::{Itertools, MinMaxResult};

use crate::{
    catalog::Catalog,
    constants::{KmPerSec, StructureId},
    dendrogram::{Dendrogram, StructureNode},
    kdist_errors::KdistError,
};

/// Velocity split (km/s, non-negative) of every structure of one dendrogram.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocitySplit {
    splits: BTreeMap<StructureId, KmPerSec>,
}

impl VelocitySplit {
    pub fn get(&self, id: StructureId) -> Option<KmPerSec> {
        self.splits.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// `(id, split)` pairs in increasing id order.
    pub fn iter(&self) -> impl Iterator<Item = (StructureId, KmPerSec)> + '_ {
        self.splits.iter().map(|(id, split)| (*id, *split))
    }

    /// Splits aligned with the catalog rows, `None` if a row has no structure in the dendrogram.
    pub fn in_catalog_order(&self, catalog: &Catalog) -> Option<Vec<KmPerSec>> {
        catalog.iter().map(|row| self.get(row.id)).collect()
    }
}

fn central_velocity(catalog: &Catalog, id: StructureId) -> Result<KmPerSec, KdistError> {
    let v_cen = catalog
        .row_by_id(id)
        .map(|row| row.v_cen)
        .ok_or(KdistError::MissingCatalogRow(id))?;
    if !v_cen.is_finite() {
        return Err(KdistError::InvalidArgument(format!(
            "structure {id} has a non-finite v_cen ({v_cen})"
        )));
    }
    Ok(v_cen)
}

fn node_split(node: &StructureNode, catalog: &Catalog) -> Result<KmPerSec, KdistError> {
    if !node.is_merger() {
        return Ok(0.0);
    }

    let velocities = node
        .children()
        .iter()
        .map(|child| central_velocity(catalog, child.id()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match velocities.into_iter().minmax_by(f64::total_cmp) {
        MinMaxResult::MinMax(min, max) => max - min,
        MinMaxResult::OneElement(_) | MinMaxResult::NoElements => 0.0,
    })
}

/// Compute the velocity split of every structure of `dendrogram`.
///
/// Arguments
/// -----------------
/// * `dendrogram`: the structure forest; disjoint trees are handled independently.
/// * `catalog`: the catalog sharing the dendrogram id space, read for `v_cen`.
///
/// Return
/// ----------
/// * A [`VelocitySplit`] with exactly one entry per structure of the forest.
/// * [`KdistError::MissingCatalogRow`] if a structure of the tree has no catalog row.
/// * [`KdistError::InvalidArgument`] if a structure of the tree has a non-finite `v_cen`.
pub fn calculate_velocity_split(
    dendrogram: &Dendrogram,
    catalog: &Catalog,
) -> Result<VelocitySplit, KdistError> {
    let mut splits = BTreeMap::new();
    for node in dendrogram.iter() {
        central_velocity(catalog, node.id())?;
        splits.insert(node.id(), node_split(node, catalog)?);
    }
    Ok(VelocitySplit { splits })
}
