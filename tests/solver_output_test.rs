use kdist::catalog::{Catalog, CatalogRow};
use kdist::kdist_errors::KdistError;
use kdist::solver::encoder::encode_catalog;
use kdist::solver::parser::{parse_solver_output, parse_solver_output_expecting};
use kdist::solver::{Encoding, NearFar};

const REVISED_RUN: &str = "\
! Revised kinematic distance, Reid et al. rotation curve
!
! Source     Gal Long  Gal Lat    V_lsr     V_rev    Rev. D_k     +/-
!              (deg)    (deg)    (km/s)    (km/s)     (kpc)      (kpc)
test          123.022   -0.574    -10.0      -8.6      0.41    0.30   -0.29

! finished
";

#[test]
fn test_revised_probe_answer() {
    let records = parse_solver_output_expecting(REVISED_RUN, 1).unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].repaired);

    let record = &records[0].record;
    assert_eq!(record.name, "test");
    assert_eq!(record.gal_long, 123.022);
    assert_eq!(record.d_k, 0.41);
    assert_eq!(record.error_d_k_minus, -0.29);
}

#[test]
fn test_mixed_good_and_collided_lines() {
    let output = "\
! Source     Gal Long  Gal Lat    V_lsr     V_rev    Rev. D_k     +/-
  0   120.500    0.250    -45.2     -43.9      2.10    0.30   -0.30
  1   121.000   -0.750    -60.0     -58.1  12.345-0.61  0.58
  2   135.250    1.100    -30.4     -29.0      1.95    0.22   -0.18
";
    let records = parse_solver_output_expecting(output, 3).unwrap();
    let repaired: Vec<bool> = records.iter().map(|r| r.repaired).collect();
    assert_eq!(repaired, vec![false, true, false]);

    assert_eq!(records[1].record.name, "1");
    assert_eq!(records[1].record.v_rev, -58.1);
    assert_eq!(records[1].record.d_k, 0.0);
    assert_eq!(records[2].record.d_k, 1.95);
}

#[test]
fn test_count_mismatch_is_reported() {
    let output = "  0 120.5 0.25 -45.2 -43.9 2.10 0.30 -0.30\n";
    assert_eq!(
        parse_solver_output_expecting(output, 2),
        Err(KdistError::RowCountMismatch {
            expected: 2,
            found: 1
        })
    );
    assert_eq!(
        parse_solver_output_expecting("! only commentary\n\n", 2),
        Err(KdistError::SolverProducedNoOutput { expected: 2 })
    );
}

#[test]
fn test_unrepairable_line_aborts_the_run() {
    let output = "\
  0 120.5 0.25 -45.2 -43.9 2.10 0.30 -0.30
  1 121.0
";
    assert!(matches!(
        parse_solver_output(output),
        Err(KdistError::MalformedRecord { .. })
    ));
}

#[test]
fn test_encoded_request_matches_catalog() {
    let catalog = Catalog::new(vec![
        CatalogRow::new(4, 30.0, -1.0, -10.0),
        CatalogRow::new(5, 359.5, 0.125, 250.04),
    ])
    .unwrap();

    let galactic = encode_catalog(&catalog, NearFar::Far, Encoding::Galactic).unwrap();
    assert_eq!(
        galactic,
        "4 030.000 -01.000   -10.0 1\n5 359.500 +00.125   250.0 1\n"
    );

    let equatorial = encode_catalog(&catalog, NearFar::Near, Encoding::Equatorial).unwrap();
    let lines: Vec<&str> = equatorial.lines().collect();
    assert_eq!(lines.len(), 2);
    for (line, row) in lines.iter().zip(&catalog) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields.len(), 5, "{line}");
        assert_eq!(fields[0], row.id.to_string());
        assert_eq!(fields[1].len(), 9, "{line}");
        assert_eq!(fields[2].len(), 10, "{line}");
        assert_eq!(fields[4], "0");
    }
}
