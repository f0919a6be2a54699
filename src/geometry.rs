use nalgebra::Vector3;

use crate::constants::{Degree, Meter, RADEG};

/// Fold the magnetic declination and the meridian convergence corrections
/// into one adjusted bearing.
///
/// Arguments
/// ---------
/// * `azimuth`: raw compass reading of the shot in degrees
/// * `declination`: magnetic declination of the survey in degrees (0 when absent)
/// * `convergence`: meridian convergence of the survey in degrees (0 when absent)
///
/// Return
/// ------
/// * the effective grid bearing in degrees, `azimuth + declination - convergence`
pub fn adjusted_bearing(azimuth: Degree, declination: Degree, convergence: Degree) -> Degree {
    azimuth + declination - convergence
}

/// Convert a polar shot reading into a Cartesian displacement vector.
///
/// Axis convention shared by every caller: x east, y north, z up, so an
/// inclination-free shot at bearing 0 displaces along +y.
///
/// Arguments
/// ---------
/// * `length`: measured shot length in meters (> 0 for valid shots)
/// * `bearing`: effective bearing in degrees (see [`adjusted_bearing`])
/// * `clino`: inclination in degrees, -90..90
///
/// Return
/// ------
/// * the displacement `Vector3` from the shot's `from` station to its `to` end
pub fn polar_displacement(length: Meter, bearing: Degree, clino: Degree) -> Vector3<f64> {
    let az = bearing * RADEG;
    let incl = clino * RADEG;
    let horizontal = length * incl.cos();
    Vector3::new(
        horizontal * az.sin(),
        horizontal * az.cos(),
        length * incl.sin(),
    )
}
