//! Inverse EOV (EPSG:23700) to WGS84.
//!
//! EOV is a Swiss-style oblique conformal cylindrical projection (`somerc`)
//! on the GRS67 ellipsoid with the HD72 datum. The inverse runs in three
//! stages: inverse Mercator on the Gaussian sphere, un-rotation to the
//! ellipsoid with an iterative latitude solve, then an HD72 → WGS84
//! geocentric translation. Residual error stays around a meter over
//! Hungary, well inside cave-survey tolerances.

use crate::constants::{Degree, Radian, RADEG};

use super::{GeoCoordinate, ProjectedCoordinate};

/// GRS67 semi-major axis in meters
const A: f64 = 6_378_160.0;
/// GRS67 flattening
const F: f64 = 1.0 / 298.247_167_427;
/// Latitude of the projection center (Gellérthegy), degrees
const LAT0: Degree = 47.144_393_722_22;
/// Longitude of the projection center, degrees east of Greenwich
const LON0: Degree = 19.048_571_777_78;
/// Scale factor on the normal parallel
const K0: f64 = 0.99993;
/// False easting in meters
const FALSE_EASTING: f64 = 650_000.0;
/// False northing in meters
const FALSE_NORTHING: f64 = 200_000.0;

/// HD72 → WGS84 geocentric translation, meters
const DX: f64 = 52.17;
const DY: f64 = -71.82;
const DZ: f64 = -14.9;

const FORTPI: f64 = std::f64::consts::FRAC_PI_4;

/// Precomputed oblique-Mercator setup constants for the projection center.
struct Setup {
    e: f64,
    es: f64,
    /// Gaussian sphere exponent α
    c: f64,
    sinp0: f64,
    cosp0: f64,
    /// Integration constant of the conformal mapping
    k: f64,
    /// Radius of the projection sphere scaled by k0, meters
    kr: f64,
}

fn setup() -> Setup {
    let es = F * (2.0 - F);
    let e = es.sqrt();
    let phi0 = LAT0 * RADEG;

    let cp2 = phi0.cos() * phi0.cos();
    let c = (1.0 + es * cp2 * cp2 / (1.0 - es)).sqrt();
    let sp = phi0.sin();
    let sinp0 = sp / c;
    let phip0 = sinp0.asin();
    let cosp0 = phip0.cos();

    let esp0 = e * sp;
    let k = (FORTPI + 0.5 * phip0).tan().ln()
        - c * ((FORTPI + 0.5 * phi0).tan().ln() - 0.5 * e * ((1.0 + esp0) / (1.0 - esp0)).ln());
    let kr = A * K0 * (1.0 - es).sqrt() / (1.0 - esp0 * esp0);

    Setup {
        e,
        es,
        c,
        sinp0,
        cosp0,
        k,
        kr,
    }
}

/// Convert an EOV coordinate to WGS84 latitude/longitude.
///
/// Arguments
/// ---------
/// * `coordinate`: EOV easting (Y) / northing (X) in meters, elevation used
///   only for the geocentric datum shift
///
/// Return
/// ------
/// * geographic WGS84 coordinate of the point
pub fn to_wgs84(coordinate: &ProjectedCoordinate) -> GeoCoordinate {
    let s = setup();

    let x = coordinate.easting - FALSE_EASTING;
    let y = coordinate.northing - FALSE_NORTHING;

    // Inverse normal Mercator on the projection sphere.
    let phipp = 2.0 * ((y / s.kr).exp().atan() - FORTPI);
    let lampp = x / s.kr;

    // Un-rotate the oblique graticule back to the Gaussian sphere.
    let cp = phipp.cos();
    let phip = (s.cosp0 * phipp.sin() + s.sinp0 * cp * lampp.cos()).asin();
    let lamp = (cp * lampp.sin() / phip.cos()).asin();

    // Ellipsoidal latitude by fixed-point iteration of the conformal mapping.
    let con = (s.k - (FORTPI + 0.5 * phip).tan().ln()) / s.c;
    let mut phi = phip;
    for _ in 0..10 {
        let esp = s.e * phi.sin();
        let delp = (con + (FORTPI + 0.5 * phi).tan().ln()
            - 0.5 * s.e * ((1.0 + esp) / (1.0 - esp)).ln())
            * (1.0 - esp * esp)
            * phi.cos()
            / (1.0 - s.es);
        phi -= delp;
        if delp.abs() < 1e-12 {
            break;
        }
    }
    let lam = lamp / s.c + LON0 * RADEG;

    hd72_to_wgs84(phi, lam, coordinate.elevation)
}

/// Apply the HD72 → WGS84 datum shift via geocentric coordinates.
fn hd72_to_wgs84(lat: Radian, lon: Radian, height: f64) -> GeoCoordinate {
    // HD72 geodetic → geocentric on GRS67.
    let es_src = F * (2.0 - F);
    let sin_lat = lat.sin();
    let n = A / (1.0 - es_src * sin_lat * sin_lat).sqrt();
    let x = (n + height) * lat.cos() * lon.cos() + DX;
    let y = (n + height) * lat.cos() * lon.sin() + DY;
    let z = (n * (1.0 - es_src) + height) * sin_lat + DZ;

    // Geocentric → geodetic on WGS84, iterating the latitude.
    let a_dst = 6_378_137.0;
    let f_dst = 1.0 / 298.257_223_563;
    let es_dst = f_dst * (2.0 - f_dst);

    let lon_out = y.atan2(x);
    let p = (x * x + y * y).sqrt();
    let mut lat_out = z.atan2(p * (1.0 - es_dst));
    for _ in 0..6 {
        let sl = lat_out.sin();
        let n_dst = a_dst / (1.0 - es_dst * sl * sl).sqrt();
        lat_out = (z + es_dst * n_dst * sl).atan2(p);
    }

    GeoCoordinate {
        latitude: lat_out / RADEG,
        longitude: lon_out / RADEG,
    }
}
