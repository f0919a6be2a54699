use ahash::AHashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{ShotRefs, StationName, SurveyName};
use crate::geodesy::{GeoCoordinate, ProjectedCoordinate};
use crate::karst_errors::KarstError;

use super::ShotType;

/// The coordinate triple of a resolved station: local frame, optional
/// projected grid coordinate, optional geographic coordinate.
///
/// `projected`/`geographic` stay `None` for stations with no fix-point
/// ancestor, which is allowed and common.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCoordinates {
    /// Position relative to the seed of the first survey.
    pub local: Vector3<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected: Option<ProjectedCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic: Option<GeoCoordinate>,
}

/// One resolved 3D point of the cave.
///
/// Stations carry plain-key back-references to the shots connecting at
/// them; the keys are resolved through the owning cave, so the station map
/// stays a flat, cycle-free value collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyStation {
    pub shot_type: ShotType,
    /// Absolute position in the cave's shared local frame.
    pub position: Vector3<f64>,
    pub coordinates: StationCoordinates,
    /// Name of the survey whose shot placed this station.
    pub survey: SurveyName,
    pub shots: ShotRefs,
}

/// The cave-wide shared station map.
///
/// Stations are globally unique by name; re-placing an existing name is a
/// programming-invariant violation, so the only insert is the checked one.
/// Entries are never moved once placed, only added — and discarded
/// wholesale when the cave is recomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMap(AHashMap<StationName, SurveyStation>);

impl StationMap {
    pub fn new() -> Self {
        StationMap(AHashMap::new())
    }

    /// Insert a freshly placed station.
    ///
    /// Arguments
    /// ---------
    /// * `name`: station name to place
    /// * `station`: the resolved station
    /// * `shot_from`/`shot_to`: endpoint names of the placing shot, quoted
    ///   in the error when the name is already taken
    ///
    /// Return
    /// ------
    /// * `Ok(())`, or [`KarstError::StationAlreadyPlaced`] — a fatal
    ///   invariant violation, not a user data error
    pub fn insert(
        &mut self,
        name: StationName,
        station: SurveyStation,
        shot_from: &str,
        shot_to: &str,
    ) -> Result<(), KarstError> {
        if self.0.contains_key(&name) {
            return Err(KarstError::StationAlreadyPlaced {
                station: name,
                from: shot_from.to_string(),
                to: shot_to.to_string(),
            });
        }
        self.0.insert(name, station);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SurveyStation> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SurveyStation> {
        self.0.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Discard every station. The next reconstruction rebuilds the map
    /// from scratch; stations have no identity across recomputations.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StationName, &SurveyStation)> {
        self.0.iter()
    }

    /// Move a station to a new name, used by the station rename editor
    /// helper. No-op when `old` is absent.
    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        if let Some(station) = self.0.remove(old) {
            self.0.insert(new.to_string(), station);
        }
    }
}
