//! # Projected coordinate systems and geographic conversion
//!
//! This module defines the projected coordinate types handled by the crate
//! and the pure conversion routines turning a projected coordinate into
//! WGS84 latitude/longitude. Two systems are supported:
//!
//! - **EOV** (EPSG:23700), the Hungarian Uniform National Projection — a
//!   Swiss-style oblique Mercator on the GRS67 ellipsoid, followed by an
//!   HD72 → WGS84 datum shift ([`eov`]).
//! - **UTM**, any zone and hemisphere, via the standard inverse transverse
//!   Mercator series on WGS84 ([`utm`]).
//!
//! The conversions are consumed by the reconstruction engine when it
//! propagates fix-point coordinates through the station network; they have
//! no side effects and no state.

pub mod eov;
pub mod utm;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter};
use crate::karst_errors::KarstError;

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

/// Tag of the projected coordinate system a cave is georeferenced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Hungarian Uniform National Projection (EPSG:23700).
    Eov,
    /// Universal Transverse Mercator on WGS84.
    Utm { zone: u8, hemisphere: Hemisphere },
}

impl CoordinateSystem {
    /// Build a UTM coordinate system tag, validating the zone number.
    ///
    /// Arguments
    /// ---------
    /// * `zone`: UTM zone, 1..=60
    /// * `hemisphere`: which half of the globe the northing is counted in
    ///
    /// Return
    /// ------
    /// * the tag, or [`KarstError::InvalidUtmZone`] for an out-of-range zone
    pub fn utm(zone: u8, hemisphere: Hemisphere) -> Result<Self, KarstError> {
        if !(1..=60).contains(&zone) {
            return Err(KarstError::InvalidUtmZone(zone));
        }
        Ok(CoordinateSystem::Utm { zone, hemisphere })
    }
}

/// A projected coordinate with elevation, in meters.
///
/// `easting`/`northing` live on the grid of the tagged [`CoordinateSystem`];
/// at cave scale the grid axes are treated as locally Cartesian, so shot
/// displacements add component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCoordinate {
    pub easting: Meter,
    pub northing: Meter,
    pub elevation: Meter,
}

impl ProjectedCoordinate {
    pub fn new(easting: Meter, northing: Meter, elevation: Meter) -> Self {
        ProjectedCoordinate {
            easting,
            northing,
            elevation,
        }
    }

    /// Translate by a local displacement vector (x east, y north, z up).
    pub fn translated(&self, displacement: &Vector3<f64>) -> Self {
        ProjectedCoordinate {
            easting: self.easting + displacement.x,
            northing: self.northing + displacement.y,
            elevation: self.elevation + displacement.z,
        }
    }
}

/// A geographic WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: Degree,
    pub longitude: Degree,
}

/// Convert a projected coordinate to WGS84 latitude/longitude.
///
/// Arguments
/// ---------
/// * `coordinate`: the projected position (elevation is ignored by both
///   projections beyond the datum shift)
/// * `system`: which grid `coordinate` lives on
///
/// Return
/// ------
/// * the WGS84 [`GeoCoordinate`] of the point
pub fn to_lat_lon(coordinate: &ProjectedCoordinate, system: &CoordinateSystem) -> GeoCoordinate {
    match system {
        CoordinateSystem::Eov => eov::to_wgs84(coordinate),
        CoordinateSystem::Utm { zone, hemisphere } => {
            utm::to_wgs84(coordinate, *zone, *hemisphere)
        }
    }
}
