//! Inverse Universal Transverse Mercator on the WGS84 ellipsoid.
//!
//! Standard inverse series (footpoint latitude + sixth-order corrections),
//! accurate to well under a meter inside a zone, which is far beyond what
//! cave-scale coordinate propagation needs.

use crate::constants::{Degree, RADEG};

use super::{GeoCoordinate, Hemisphere, ProjectedCoordinate};

/// WGS84 semi-major axis in meters
const A: f64 = 6_378_137.0;
/// WGS84 flattening
const F: f64 = 1.0 / 298.257_223_563;
/// UTM central meridian scale factor
const K0: f64 = 0.9996;
/// UTM false easting in meters
const FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing for the southern hemisphere in meters
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Longitude of the central meridian of a UTM zone, in degrees.
pub(crate) fn central_meridian(zone: u8) -> Degree {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Convert a UTM coordinate to WGS84 latitude/longitude.
///
/// Arguments
/// ---------
/// * `coordinate`: easting/northing on the zone grid, meters
/// * `zone`: UTM zone 1..=60 (validated at [`CoordinateSystem`](super::CoordinateSystem) construction)
/// * `hemisphere`: selects the false-northing convention
///
/// Return
/// ------
/// * geographic WGS84 coordinate of the point
pub fn to_wgs84(
    coordinate: &ProjectedCoordinate,
    zone: u8,
    hemisphere: Hemisphere,
) -> GeoCoordinate {
    let e2 = F * (2.0 - F);
    let ep2 = e2 / (1.0 - e2);

    let x = coordinate.easting - FALSE_EASTING;
    let y = match hemisphere {
        Hemisphere::North => coordinate.northing,
        Hemisphere::South => coordinate.northing - FALSE_NORTHING_SOUTH,
    };

    // Footpoint latitude from the meridian arc.
    let m = y / K0;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));

    let sqrt_1me2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let latitude = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * ep2
                    - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let longitude = (d
        - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
            * d.powi(5)
            / 120.0)
        / cos_phi1;

    GeoCoordinate {
        latitude: latitude / RADEG,
        longitude: central_meridian(zone) + longitude / RADEG,
    }
}
