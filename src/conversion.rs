use crate::constants::{Degree, DEG_TO_HOURS};

const CENTISECONDS_PER_UNIT: u64 = 360_000;
const CENTISECONDS_PER_MINUTE: u64 = 6_000;
const RA_CENTISECONDS_PER_TURN: u64 = 24 * CENTISECONDS_PER_UNIT;

/// Sexagesimal decomposition of an angle, rounded to hundredths of a second.
///
/// `units` are hours for a right ascension and degrees for a declination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sexagesimal {
    pub negative: bool,
    pub units: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl Sexagesimal {
    /// Split a non-negative number of centiseconds into units, minutes and seconds.
    fn from_centiseconds(negative: bool, centiseconds: u64) -> Self {
        Sexagesimal {
            negative,
            units: centiseconds / CENTISECONDS_PER_UNIT,
            minutes: (centiseconds % CENTISECONDS_PER_UNIT) / CENTISECONDS_PER_MINUTE,
            seconds: (centiseconds % CENTISECONDS_PER_MINUTE) as f64 / 100.0,
        }
    }
}

/// Decompose a right ascension into hours, minutes and seconds.
///
/// The rounding to hundredths of a second is done on the total before splitting,
/// so a value like `59.996 s` carries into the minutes instead of printing `60.00`.
/// A right ascension that rounds up to `24h` wraps to `0h`.
///
/// Arguments
/// ---------
/// * `ra`: right ascension in degrees, any real value (wrapped into `[0, 360)`)
///
/// Returns
/// -------
/// * The `(h, m, s)` decomposition, never negative.
pub(crate) fn ra_to_hms(ra: Degree) -> Sexagesimal {
    let hours = ra.rem_euclid(360.0) * DEG_TO_HOURS;
    let centiseconds = (hours * CENTISECONDS_PER_UNIT as f64).round() as u64;
    Sexagesimal::from_centiseconds(false, centiseconds % RA_CENTISECONDS_PER_TURN)
}

/// Decompose a declination into signed degrees, arcminutes and arcseconds.
///
/// The sign is carried separately so that declinations in `(-1°, 0°)` keep their sign.
pub(crate) fn dec_to_dms(dec: Degree) -> Sexagesimal {
    let centiseconds = (dec.abs() * CENTISECONDS_PER_UNIT as f64).round() as u64;
    Sexagesimal::from_centiseconds(dec < 0.0 && centiseconds > 0, centiseconds)
}

/// Format a right ascension as the compact `HHMMSS.SS` string read by the revised solver.
pub(crate) fn format_ra_hms(ra: Degree) -> String {
    let hms = ra_to_hms(ra);
    format!("{:02}{:02}{:05.2}", hms.units, hms.minutes, hms.seconds)
}

/// Format a declination as the compact `±DDMMSS.SS` string read by the revised solver.
///
/// The sign is always explicit.
pub(crate) fn format_dec_dms(dec: Degree) -> String {
    let dms = dec_to_dms(dec);
    let sign = if dms.negative { '-' } else { '+' };
    format!(
        "{sign}{:02}{:02}{:05.2}",
        dms.units, dms.minutes, dms.seconds
    )
}

#[cfg(test)]
mod conversion_test {
    use super::*;

    #[test]
    fn test_ra_to_hms() {
        let hms = ra_to_hms(15.0 + 2.0 / 4.0 + 3.04 / 240.0);
        assert_eq!(hms.units, 1);
        assert_eq!(hms.minutes, 2);
        assert_eq!(hms.seconds, 3.04);
        assert!(!hms.negative);

        assert_eq!(ra_to_hms(-15.0).units, 23);
        assert_eq!(ra_to_hms(375.0).units, 1);
    }

    #[test]
    fn test_ra_carry() {
        // 0h 59m 59.999s rounds to 1h 00m 00.00s
        let ra = (59.0 / 60.0 + 59.999 / 3600.0) * 15.0;
        assert_eq!(format_ra_hms(ra), "010000.00");

        // 23h 59m 59.999s wraps to 0h
        let ra = (23.0 + 59.0 / 60.0 + 59.999 / 3600.0) * 15.0;
        assert_eq!(format_ra_hms(ra), "000000.00");
    }

    #[test]
    fn test_format_ra_hms() {
        assert_eq!(format_ra_hms(0.0), "000000.00");
        assert_eq!(format_ra_hms(180.0), "120000.00");
        assert_eq!(format_ra_hms(15.0 * (17.0 + 45.0 / 60.0 + 37.2 / 3600.0)), "174537.20");
    }

    #[test]
    fn test_format_dec_dms() {
        assert_eq!(format_dec_dms(12.0 + 13.0 / 60.0 + 14.5 / 3600.0), "+121314.50");
        assert_eq!(format_dec_dms(-28.0 - 56.0 / 60.0 - 10.2 / 3600.0), "-285610.20");
        assert_eq!(format_dec_dms(0.0), "+000000.00");
        assert_eq!(format_dec_dms(-90.0), "-900000.00");
    }

    #[test]
    fn test_small_negative_declination_keeps_sign() {
        assert_eq!(format_dec_dms(-0.5), "-003000.00");
        assert_eq!(format_dec_dms(-1e-9), "+000000.00");
    }
}
