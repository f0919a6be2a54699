use std::collections::BTreeMap;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::constants::{StationName, SurveyName};
use crate::geodesy::{CoordinateSystem, ProjectedCoordinate};
use crate::karst_errors::KarstError;
use crate::reconstruction::{self, Seed};

use super::station::StationMap;
use super::survey::Survey;
use super::SurveyAlias;

/// A station with a known absolute projected coordinate, used to seed
/// global placement and geographic conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixPoint {
    pub station: StationName,
    pub coordinate: ProjectedCoordinate,
}

/// Geo-referencing data of a cave: the projected coordinate system the fix
/// points are expressed in, plus the fix points themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    pub coordinate_system: CoordinateSystem,
    pub fix_points: Vec<FixPoint>,
}

/// The cave aggregate: ordered surveys, the shared station map, aliases
/// and optional geo-referencing.
///
/// Surveys must be recomputed strictly in list order — later surveys may
/// hang off stations placed by earlier ones, directly or through aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cave {
    pub name: String,
    pub surveys: Vec<Survey>,
    pub aliases: Vec<SurveyAlias>,
    pub stations: StationMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<GeoData>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Free-form project metadata (author, editor notes, revision tags).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Normalized endpoint pairs of every processed non-splay shot, across
    /// all surveys of the last recomputation. Backs the duplicate-versus-
    /// remeasured distinction of the engine; rebuilt with the stations.
    #[serde(skip)]
    pub(crate) processed_legs: AHashSet<(StationName, StationName)>,
}

impl Cave {
    pub fn new(name: impl Into<String>) -> Self {
        Cave {
            name: name.into(),
            ..Cave::default()
        }
    }

    /// Append a survey, enforcing name uniqueness within the cave.
    pub fn add_survey(&mut self, survey: Survey) -> Result<(), KarstError> {
        if self.surveys.iter().any(|s| s.name == survey.name) {
            return Err(KarstError::DuplicateSurveyName(survey.name));
        }
        self.surveys.push(survey);
        Ok(())
    }

    pub fn survey(&self, name: &str) -> Option<&Survey> {
        self.surveys.iter().find(|s| s.name == name)
    }

    pub fn survey_mut(&mut self, name: &str) -> Option<&mut Survey> {
        self.surveys.iter_mut().find(|s| s.name == name)
    }

    /// Recompute the whole cave: discard every station, then reconstruct
    /// the surveys in list order.
    ///
    /// This is the entry point after any edit of shots, aliases or fix
    /// points — stations have no identity across recomputations.
    pub fn reconstruct_all(&mut self) -> Result<(), KarstError> {
        self.stations.clear();
        self.processed_legs.clear();
        for index in 0..self.surveys.len() {
            self.reconstruct_survey(index)?;
        }
        Ok(())
    }

    /// Reconstruct the survey at `index`, deriving its seed from the
    /// cave's fix points (only meaningful at index 0).
    ///
    /// The caller must have processed surveys `0..index` already and must
    /// not have placed this survey's stations yet; [`Cave::reconstruct_all`]
    /// maintains both invariants.
    ///
    /// Arguments
    /// ---------
    /// * `index`: position of the survey in the cave's ordered list
    ///
    /// Return
    /// ------
    /// * `Ok(())` with the survey's diagnostics and the station map
    ///   updated in place, or a fatal invariant error
    pub fn reconstruct_survey(&mut self, index: usize) -> Result<(), KarstError> {
        if index >= self.surveys.len() {
            return Err(KarstError::SurveyIndexOutOfRange(index));
        }

        let coordinate_system = self.geo_data.as_ref().map(|g| g.coordinate_system);
        let seed = if index == 0 { Some(self.derive_seed(index)) } else { None };

        let Cave {
            surveys,
            aliases,
            stations,
            processed_legs,
            ..
        } = self;

        reconstruction::reconstruct(
            &mut surveys[index],
            stations,
            aliases,
            processed_legs,
            coordinate_system,
            seed.as_ref(),
        )
    }

    /// Seed of the first survey: the origin of the local frame, plus the
    /// projected coordinate of a fix point matching the start station when
    /// one exists. An explicit, deterministic fallback — never an error.
    fn derive_seed(&self, index: usize) -> Seed {
        let start = self.surveys[index].start_station();
        let projected = match (&start, &self.geo_data) {
            (Some(start), Some(geo)) => geo
                .fix_points
                .iter()
                .find(|fp| &fp.station == start)
                .map(|fp| fp.coordinate),
            _ => None,
        };
        Seed {
            position: nalgebra::Vector3::zeros(),
            projected,
        }
    }

    /// Rename a station across the whole cave: shot endpoints, aliases,
    /// fix points, survey starts and the station map entry.
    ///
    /// Diagnostics referring to the old name stay valid (they are keyed by
    /// shot id); a full recomputation is still the caller's move after an
    /// edit session.
    pub fn rename_station(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        for survey in &mut self.surveys {
            for shot in &mut survey.shots {
                if shot.from == old {
                    shot.from = new.to_string();
                }
                if shot.to.as_deref() == Some(old) {
                    shot.to = Some(new.to_string());
                }
            }
            if survey.start.as_deref() == Some(old) {
                survey.start = Some(new.to_string());
            }
        }
        for alias in &mut self.aliases {
            if alias.from == old {
                alias.from = new.to_string();
            }
            if alias.to == old {
                alias.to = new.to_string();
            }
        }
        if let Some(geo) = &mut self.geo_data {
            for fix in &mut geo.fix_points {
                if fix.station == old {
                    fix.station = new.to_string();
                }
            }
        }
        self.stations.rename(old, new);
    }
}
