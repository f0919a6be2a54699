//! # Constants and type definitions for karst
//!
//! This module centralizes the **conversion factors** and **common type
//! definitions** used throughout the `karst` library, together with the
//! container aliases shared by the data model and the reconstruction engine.
//!
//! ## Overview
//!
//! - Unit conversions (degrees ↔ radians)
//! - Core type aliases used across the crate
//! - Identifier types for shots and stations
//! - Container types for shot back-references
//!
//! These definitions are used by all main modules, including the data model,
//! the reconstruction engine, and the geodesy layer.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-10;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;

/// Name of a survey station (unique within a cave's station map)
pub type StationName = String;
/// Name of a survey (unique within a cave)
pub type SurveyName = String;
/// Identifier of a shot, unique within its survey
pub type ShotId = u32;

// -------------------------------------------------------------------------------------------------
// Identifiers and data containers
// -------------------------------------------------------------------------------------------------

/// Key of a shot across the whole cave: owning survey plus per-survey id.
///
/// Stations keep these instead of pointers back into the surveys, so the
/// station map stays a flat value collection without reference cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShotRef {
    pub survey: SurveyName,
    pub shot_id: ShotId,
}

impl ShotRef {
    pub fn new(survey: impl Into<SurveyName>, shot_id: ShotId) -> Self {
        ShotRef {
            survey: survey.into(),
            shot_id,
        }
    }
}

/// A small, inline-optimized container for the shots meeting at one station.
pub type ShotRefs = SmallVec<[ShotRef; 4]>;
