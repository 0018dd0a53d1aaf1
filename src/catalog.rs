//! # Structure catalog
//!
//! Flat table describing every dendrogram structure, one [`CatalogRow`] per structure id.
//! The upstream decomposition fills the position/velocity/shape columns; this crate only
//! adds the kinematic distance columns and never adds or removes rows.
//!
//! ## Columns
//! -----------------
//! | column | unit | filled by |
//! |--------|------|-----------|
//! | `_idx` | – | upstream |
//! | `x_cen`, `y_cen` | deg (galactic l, b) | upstream |
//! | `v_cen`, `v_rms` | km/s | upstream |
//! | `major_sigma`, `minor_sigma`, `radius` | deg | upstream |
//! | `near_distance`, `error_near_distance_plus/minus`, `near_distance_repaired` | kpc | near merge |
//! | `far_distance`, `error_far_distance_plus/minus`, `far_distance_repaired` | kpc | far merge |
//! | `distance`, `error_distance_plus/minus`, `distance_repaired` | kpc | ambiguity resolution |
//! | `KDA_resolution` | `N` / `F` / `U` | ambiguity resolution |
//!
//! The `*_repaired` columns flag the `0.00` sentinel written when a solver line had to be
//! repaired; such a distance is **not** a physical zero distance.
//!
//! ## Persistence
//! -----------------
//! [`Catalog::from_csv_path`], [`Catalog::from_csv_reader`] and [`Catalog::write_csv`] read and
//! write the table as CSV with the column names above. Distance columns may be absent or
//! empty on input.
use std::{collections::HashMap, fmt, fs::File, io};

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, KmPerSec, Kpc, StructureId},
    kdist_errors::KdistError,
};

/// Provenance of the canonical distance of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KdaResolution {
    #[serde(rename = "N")]
    Near,
    #[serde(rename = "F")]
    Far,
    /// Near and far coincide, or the ambiguity was broken by an external criterion.
    #[serde(rename = "U")]
    Unambiguous,
}

impl KdaResolution {
    pub fn tag(&self) -> char {
        match self {
            KdaResolution::Near => 'N',
            KdaResolution::Far => 'F',
            KdaResolution::Unambiguous => 'U',
        }
    }
}

impl fmt::Display for KdaResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Which set of distance columns of a row is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceColumn {
    Near,
    Far,
    /// The canonical `distance` columns written by the ambiguity resolution.
    Resolved,
}

/// A distance with its asymmetric, non-negative error bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSolution {
    pub distance: Kpc,
    pub error_plus: Kpc,
    pub error_minus: Kpc,
    /// `true` when the values are the placeholder of a repaired solver line.
    pub repaired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "_idx")]
    pub id: StructureId,
    pub x_cen: Degree,
    pub y_cen: Degree,
    pub v_cen: KmPerSec,
    #[serde(default)]
    pub v_rms: KmPerSec,
    #[serde(default)]
    pub major_sigma: Degree,
    #[serde(default)]
    pub minor_sigma: Degree,
    #[serde(default)]
    pub radius: Degree,

    #[serde(default)]
    pub near_distance: Option<Kpc>,
    #[serde(default)]
    pub error_near_distance_plus: Option<Kpc>,
    #[serde(default)]
    pub error_near_distance_minus: Option<Kpc>,
    #[serde(default)]
    pub near_distance_repaired: bool,

    #[serde(default)]
    pub far_distance: Option<Kpc>,
    #[serde(default)]
    pub error_far_distance_plus: Option<Kpc>,
    #[serde(default)]
    pub error_far_distance_minus: Option<Kpc>,
    #[serde(default)]
    pub far_distance_repaired: bool,

    #[serde(default)]
    pub distance: Option<Kpc>,
    #[serde(default)]
    pub error_distance_plus: Option<Kpc>,
    #[serde(default)]
    pub error_distance_minus: Option<Kpc>,
    #[serde(default)]
    pub distance_repaired: bool,

    #[serde(rename = "KDA_resolution", default)]
    pub kda_resolution: Option<KdaResolution>,
}

impl CatalogRow {
    /// A row with its position and central velocity; shape columns are zero and
    /// distance columns empty.
    pub fn new(id: StructureId, x_cen: Degree, y_cen: Degree, v_cen: KmPerSec) -> Self {
        CatalogRow {
            id,
            x_cen,
            y_cen,
            v_cen,
            v_rms: 0.0,
            major_sigma: 0.0,
            minor_sigma: 0.0,
            radius: 0.0,
            near_distance: None,
            error_near_distance_plus: None,
            error_near_distance_minus: None,
            near_distance_repaired: false,
            far_distance: None,
            error_far_distance_plus: None,
            error_far_distance_minus: None,
            far_distance_repaired: false,
            distance: None,
            error_distance_plus: None,
            error_distance_minus: None,
            distance_repaired: false,
            kda_resolution: None,
        }
    }

    pub fn with_shape(
        mut self,
        v_rms: KmPerSec,
        major_sigma: Degree,
        minor_sigma: Degree,
        radius: Degree,
    ) -> Self {
        self.v_rms = v_rms;
        self.major_sigma = major_sigma;
        self.minor_sigma = minor_sigma;
        self.radius = radius;
        self
    }

    /// The distance stored in `column`, if the distance and both errors are filled.
    pub fn solution(&self, column: DistanceColumn) -> Option<DistanceSolution> {
        let (distance, plus, minus, repaired) = match column {
            DistanceColumn::Near => (
                self.near_distance,
                self.error_near_distance_plus,
                self.error_near_distance_minus,
                self.near_distance_repaired,
            ),
            DistanceColumn::Far => (
                self.far_distance,
                self.error_far_distance_plus,
                self.error_far_distance_minus,
                self.far_distance_repaired,
            ),
            DistanceColumn::Resolved => (
                self.distance,
                self.error_distance_plus,
                self.error_distance_minus,
                self.distance_repaired,
            ),
        };
        Some(DistanceSolution {
            distance: distance?,
            error_plus: plus?,
            error_minus: minus?,
            repaired,
        })
    }

    pub fn set_solution(&mut self, column: DistanceColumn, solution: DistanceSolution) {
        let (distance, plus, minus, repaired) = match column {
            DistanceColumn::Near => (
                &mut self.near_distance,
                &mut self.error_near_distance_plus,
                &mut self.error_near_distance_minus,
                &mut self.near_distance_repaired,
            ),
            DistanceColumn::Far => (
                &mut self.far_distance,
                &mut self.error_far_distance_plus,
                &mut self.error_far_distance_minus,
                &mut self.far_distance_repaired,
            ),
            DistanceColumn::Resolved => (
                &mut self.distance,
                &mut self.error_distance_plus,
                &mut self.error_distance_minus,
                &mut self.distance_repaired,
            ),
        };
        *distance = Some(solution.distance);
        *plus = Some(solution.error_plus);
        *minus = Some(solution.error_minus);
        *repaired = solution.repaired;
    }
}

/// Ordered catalog rows with unique ids.
///
/// The row order is the positional contract with the external solver: records come back
/// in the order rows were sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
    index: HashMap<StructureId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicated ids with [`KdistError::DuplicateStructureId`].
    pub fn new(rows: Vec<CatalogRow>) -> Result<Self, KdistError> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if index.insert(row.id, i).is_some() {
                return Err(KdistError::DuplicateStructureId(row.id));
            }
        }
        Ok(Catalog { rows, index })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    /// Mutable access to the rows; the row count and order cannot change through it.
    pub(crate) fn rows_mut(&mut self) -> &mut [CatalogRow] {
        &mut self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogRow> {
        self.rows.iter()
    }

    pub fn index_of(&self, id: StructureId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn row_by_id(&self, id: StructureId) -> Option<&CatalogRow> {
        self.index_of(id).map(|i| &self.rows[i])
    }

    /// Read a catalog from a CSV file with a header line.
    pub fn from_csv_path(path: &Utf8Path) -> Result<Self, KdistError> {
        Self::from_csv_reader(File::open(path)?)
    }

    /// Read a catalog from any CSV source with a header line.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, KdistError> {
        let rows = csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<CatalogRow>, csv::Error>>()?;
        Self::new(rows)
    }

    /// Write the catalog, distance columns included, as CSV with a header line.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), KdistError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogRow;
    type IntoIter = std::slice::Iter<'a, CatalogRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
