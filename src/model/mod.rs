//! # Survey data model
//!
//! The entities the reconstruction engine operates over: measured legs
//! ([`Shot`]), surveys grouping them ([`Survey`](survey::Survey)), resolved
//! stations ([`SurveyStation`](station::SurveyStation)) and the owning
//! [`Cave`](cave::Cave) aggregate.
//!
//! Shots are plain immutable values: the engine keeps its progress state
//! (processed flags, alias substitutions) outside of them, so re-running a
//! reconstruction never depends on leftover scratch state.

pub mod cave;
pub mod station;
pub mod survey;

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter, ShotId, StationName, SurveyName};

/// Kind of a measured leg.
///
/// Center shots form the survey backbone, splays capture wall detail from a
/// station into open space, auxiliary shots carry supplementary
/// measurements. Auxiliary stations cannot anchor center/splay placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotType {
    Center,
    Splay,
    Auxiliary,
}

/// One measured leg between two stations (or a station and open space for
/// splays): length, azimuth and inclination read off the instruments.
///
/// # Fields
///
/// * `id` - unique within the owning survey
/// * `shot_type` - center, splay or auxiliary
/// * `from` - name of the station the shot was taken from (required)
/// * `to` - target station name; absent or empty for splays
/// * `length` - measured length in meters, > 0
/// * `azimuth` - compass reading in degrees
/// * `clino` - inclination in degrees, -90..90
/// * `comment` - free-form note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: ShotId,
    pub shot_type: ShotType,
    pub from: StationName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<StationName>,
    pub length: Meter,
    pub azimuth: Degree,
    pub clino: Degree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Shot {
    pub fn new(
        id: ShotId,
        shot_type: ShotType,
        from: impl Into<StationName>,
        to: Option<StationName>,
        length: Meter,
        azimuth: Degree,
        clino: Degree,
    ) -> Self {
        Shot {
            id,
            shot_type,
            from: from.into(),
            to,
            length,
            azimuth,
            clino,
            comment: None,
        }
    }

    /// The target station name, with empty strings treated as absent.
    pub fn effective_to(&self) -> Option<&str> {
        self.to.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether this shot is a splay (never has a real target station).
    pub fn is_splay(&self) -> bool {
        self.shot_type == ShotType::Splay
    }

    /// The station name the far end of this shot resolves to, before any
    /// alias substitution: splays get a synthesized unique name, other
    /// shots use their own `to`.
    pub fn target_station_name(&self, survey: &SurveyName) -> Option<StationName> {
        if self.is_splay() {
            Some(splay_station_name(self.id, survey))
        } else {
            self.effective_to().map(str::to_string)
        }
    }

    /// All required fields present: `from` non-empty; `to` and `comment`
    /// are exempt. The numeric fields always exist on the typed struct.
    pub fn is_complete(&self) -> bool {
        !self.from.trim().is_empty()
    }

    /// Field constraints hold: finite numbers, positive length, azimuth in
    /// -360..360, clino in -90..90, and `from != to` when both are present.
    pub fn is_valid(&self) -> bool {
        if !self.length.is_finite() || !self.azimuth.is_finite() || !self.clino.is_finite() {
            return false;
        }
        if self.length <= 0.0 {
            return false;
        }
        if !(-360.0..=360.0).contains(&self.azimuth) || !(-90.0..=90.0).contains(&self.clino) {
            return false;
        }
        match self.effective_to() {
            Some(to) => to != self.from,
            None => true,
        }
    }
}

/// Synthesized unique station name for the far end of a splay shot.
pub fn splay_station_name(id: ShotId, survey: &SurveyName) -> StationName {
    format!("splay-{id}@{survey}")
}

/// A declared equivalence between two differently-named stations in
/// different surveys; consulted only when direct name matching fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAlias {
    pub from: StationName,
    pub to: StationName,
}

impl SurveyAlias {
    pub fn new(from: impl Into<StationName>, to: impl Into<StationName>) -> Self {
        SurveyAlias {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The partner of `name` in this alias pair, if `name` is one of the
    /// two endpoints. The pair is unordered.
    pub fn other(&self, name: &str) -> Option<&str> {
        if self.from == name {
            Some(&self.to)
        } else if self.to == name {
            Some(&self.from)
        } else {
            None
        }
    }
}

/// Which alias substitution the engine applied while processing a shot.
///
/// Rebuilt on every reconstruction together with the diagnostic sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSubstitution {
    /// Station actually used in place of the shot's `from`.
    pub from: Option<StationName>,
    /// Station actually used in place of the shot's `to`.
    pub to: Option<StationName>,
}
