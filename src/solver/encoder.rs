//! Encoding of catalog rows into solver input records.
//!
//! One line per row, fields separated by a single space and terminated by `\n`:
//!
//! ```text
//! Equatorial:  NAME HHMMSS.SS ±DDMMSS.SS VVVVV.V F
//! Galactic:    NAME LLL.LLL ±BB.BBB VVVVV.V F
//! ```
//!
//! `NAME` is the structure id, `VVVVV.V` the central velocity right aligned in 7 characters
//! and `F` the direction flag (`0` near, `1` far). The output of the solver is realigned on
//! the catalog by position, so lines are emitted in catalog order.
use itertools::Itertools;

use crate::{
    catalog::{Catalog, CatalogRow},
    conversion::{format_dec_dms, format_ra_hms},
    kdist_errors::KdistError,
    ref_system::galactic_to_equatorial,
};

use super::{Encoding, NearFar};

fn check_finite(row: &CatalogRow) -> Result<(), KdistError> {
    let fields = [("x_cen", row.x_cen), ("y_cen", row.y_cen), ("v_cen", row.v_cen)];
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(KdistError::InvalidArgument(format!(
            "structure {} has a non-finite {name} ({value})",
            row.id
        ))),
        None => Ok(()),
    }
}

fn position_fields(row: &CatalogRow, encoding: Encoding) -> (String, String) {
    match encoding {
        Encoding::Equatorial => {
            let (ra, dec) = galactic_to_equatorial(row.x_cen, row.y_cen);
            (format_ra_hms(ra), format_dec_dms(dec))
        }
        Encoding::Galactic => (
            format!("{:07.3}", row.x_cen),
            format!("{:+07.3}", row.y_cen),
        ),
    }
}

/// Encode a single catalog row as one solver input line, newline included.
///
/// Arguments
/// -----------------
/// * `row`: the structure to encode, `x_cen`/`y_cen` galactic degrees, `v_cen` km/s.
/// * `nearfar`: the solution requested from the solver.
/// * `encoding`: position format of the targeted solver variant.
///
/// Return
/// ----------
/// * The encoded line, or [`KdistError::InvalidArgument`] if a position or velocity is not finite.
pub fn encode_row(
    row: &CatalogRow,
    nearfar: NearFar,
    encoding: Encoding,
) -> Result<String, KdistError> {
    check_finite(row)?;
    let (lon_field, lat_field) = position_fields(row, encoding);
    let line = [
        row.id.to_string(),
        lon_field,
        lat_field,
        format!("{:7.1}", row.v_cen),
        nearfar.direction_flag().to_string(),
    ]
    .iter()
    .join(" ");
    Ok(line + "\n")
}

/// Encode a sequence of rows, keeping their order.
pub fn encode_rows<'a, I>(
    rows: I,
    nearfar: NearFar,
    encoding: Encoding,
) -> Result<String, KdistError>
where
    I: IntoIterator<Item = &'a CatalogRow>,
{
    rows.into_iter()
        .map(|row| encode_row(row, nearfar, encoding))
        .collect()
}

/// Encode every row of a catalog, in catalog order.
pub fn encode_catalog(
    catalog: &Catalog,
    nearfar: NearFar,
    encoding: Encoding,
) -> Result<String, KdistError> {
    encode_rows(catalog, nearfar, encoding)
}

#[cfg(test)]
mod encoder_test {
    use super::*;

    #[test]
    fn test_galactic_encoding() {
        let row = CatalogRow::new(12, 30.0, -1.0, -10.0);
        assert_eq!(
            encode_row(&row, NearFar::Near, Encoding::Galactic).unwrap(),
            "12 030.000 -01.000   -10.0 0\n"
        );

        let row = CatalogRow::new(3, 135.2578, 0.4, -52.36);
        assert_eq!(
            encode_row(&row, NearFar::Far, Encoding::Galactic).unwrap(),
            "3 135.258 +00.400   -52.4 1\n"
        );
    }

    #[test]
    fn test_equatorial_encoding_of_galactic_center() {
        let row = CatalogRow::new(0, 0.0, 0.0, 7.0);
        let line = encode_row(&row, NearFar::Far, Encoding::Equatorial).unwrap();
        let fields: Vec<&str> = line.split_whitespace().collect();

        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "0");
        assert!(fields[1].starts_with("174537."), "{line}");
        assert_eq!(fields[1].len(), 9);
        assert!(fields[2].starts_with("-285610."), "{line}");
        assert_eq!(fields[2].len(), 10);
        assert!(line.ends_with("     7.0 1\n"), "{line}");
    }

    #[test]
    fn test_equatorial_encoding_keeps_declination_sign() {
        // l = 32°, b = 0° lies less than a degree below the celestial equator
        let row = CatalogRow::new(8, 32.0, 0.0, 95.0);
        let line = encode_row(&row, NearFar::Near, Encoding::Equatorial).unwrap();
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert!(fields[2].starts_with("-0049"), "{line}");
    }

    #[test]
    fn test_velocity_field_is_seven_wide() {
        let row = CatalogRow::new(1, 120.0, 0.0, -105.2);
        let line = encode_row(&row, NearFar::Near, Encoding::Galactic).unwrap();
        assert_eq!(line, "1 120.000 +00.000  -105.2 0\n");

        let row = CatalogRow::new(1, 120.0, 0.0, 3.0);
        let line = encode_row(&row, NearFar::Near, Encoding::Galactic).unwrap();
        assert_eq!(line, "1 120.000 +00.000     3.0 0\n");
    }

    #[test]
    fn test_catalog_order_is_kept() {
        let catalog = Catalog::new(vec![
            CatalogRow::new(9, 120.0, 0.0, -40.0),
            CatalogRow::new(2, 121.0, 0.0, -41.0),
            CatalogRow::new(5, 122.0, 0.0, -42.0),
        ])
        .unwrap();
        let encoded = encode_catalog(&catalog, NearFar::Near, Encoding::Galactic).unwrap();
        let names: Vec<&str> = encoded
            .lines()
            .map(|l| l.split(' ').next().unwrap())
            .collect();
        assert_eq!(names, vec!["9", "2", "5"]);
        assert!(encoded.ends_with('\n'));
    }

    #[test]
    fn test_non_finite_rejected() {
        let row = CatalogRow::new(4, f64::NAN, 0.0, -10.0);
        assert!(matches!(
            encode_row(&row, NearFar::Near, Encoding::Galactic),
            Err(KdistError::InvalidArgument(_))
        ));
    }
}
