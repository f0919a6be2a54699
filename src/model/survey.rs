use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, ShotId, StationName, SurveyName};

use super::{AliasSubstitution, Shot};

/// Instrument used on a survey trip, as a free-form name/value pair
/// (e.g. compass model and its calibration note).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub value: String,
}

/// Trip metadata attached to a survey.
///
/// `declination` and `convergence` feed the bearing correction of every
/// shot in the survey; both default to 0 when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyMetadata {
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declination: Option<Degree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence: Option<Degree>,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub instruments: Vec<Instrument>,
}

/// An ordered set of shots sharing one reference frame, plus the
/// diagnostic sets the reconstruction engine rebuilds on every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub name: SurveyName,
    pub visible: bool,
    #[serde(default)]
    pub metadata: SurveyMetadata,
    /// Explicit start station; when absent the first valid shot's `from`
    /// is used and written back here by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StationName>,
    pub shots: Vec<Shot>,

    /// Shots whose endpoints never got placed in the last reconstruction.
    #[serde(default)]
    pub orphan_shot_ids: BTreeSet<ShotId>,
    /// Shots found redundant between two already-placed stations.
    #[serde(default)]
    pub duplicate_shot_ids: BTreeSet<ShotId>,
    /// True iff zero shots of this survey were placed.
    #[serde(default)]
    pub isolated: bool,
    /// Alias substitutions the engine applied, keyed by shot id.
    #[serde(default)]
    pub alias_substitutions: BTreeMap<ShotId, AliasSubstitution>,
}

impl Survey {
    pub fn new(name: impl Into<SurveyName>) -> Self {
        Survey {
            name: name.into(),
            visible: true,
            metadata: SurveyMetadata::default(),
            start: None,
            shots: Vec::new(),
            orphan_shot_ids: BTreeSet::new(),
            duplicate_shot_ids: BTreeSet::new(),
            isolated: false,
            alias_substitutions: BTreeMap::new(),
        }
    }

    /// The shots the reconstruction engine operates on: valid and complete.
    pub fn valid_shots(&self) -> Vec<&Shot> {
        self.shots
            .iter()
            .filter(|s| s.is_complete() && s.is_valid())
            .collect()
    }

    /// Start station of this survey: the explicit `start` when set and
    /// non-empty, otherwise the `from` of the first valid shot.
    pub fn start_station(&self) -> Option<StationName> {
        if let Some(start) = &self.start {
            if !start.trim().is_empty() {
                return Some(start.clone());
            }
        }
        self.valid_shots().first().map(|s| s.from.clone())
    }

    /// Drop every derived diagnostic. Called at the top of each
    /// reconstruction so stale results never survive a data change.
    pub fn clear_diagnostics(&mut self) {
        self.orphan_shot_ids.clear();
        self.duplicate_shot_ids.clear();
        self.alias_substitutions.clear();
        self.isolated = false;
    }

    /// Effective endpoint names of a shot after the recorded alias
    /// substitutions: `(from, to)` with `to` being the synthesized name
    /// for splays.
    pub fn effective_endpoints(&self, shot: &Shot) -> (StationName, Option<StationName>) {
        let substitution = self.alias_substitutions.get(&shot.id);
        let from = substitution
            .and_then(|s| s.from.clone())
            .unwrap_or_else(|| shot.from.clone());
        let to = substitution
            .and_then(|s| s.to.clone())
            .or_else(|| shot.target_station_name(&self.name));
        (from, to)
    }
}
