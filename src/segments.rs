use crate::model::station::StationMap;
use crate::model::survey::Survey;
use crate::model::ShotType;

/// Flat coordinate sequences for rendering one survey, one
/// `(x1, y1, z1, x2, y2, z2)` sextuple per drawable shot, split by shot
/// type. Shots whose endpoints did not resolve to positions are skipped —
/// there is nothing to draw for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentSet {
    pub center: Vec<[f64; 6]>,
    pub splay: Vec<[f64; 6]>,
    pub auxiliary: Vec<[f64; 6]>,
}

impl SegmentSet {
    pub fn total_len(&self) -> usize {
        self.center.len() + self.splay.len() + self.auxiliary.len()
    }
}

/// Extract the drawable segments of a survey from the resolved station map.
///
/// Arguments
/// ---------
/// * `survey`: the survey whose valid shots are walked, using the alias
///   substitutions recorded by the last reconstruction
/// * `stations`: the cave-wide station map the endpoints resolve against
///
/// Return
/// ------
/// * the per-type segment sequences; rendering consumers read these and
///   must never mutate station positions
pub fn extract_segments(survey: &Survey, stations: &StationMap) -> SegmentSet {
    let mut segments = SegmentSet::default();

    for shot in survey.valid_shots() {
        let (from_name, to_name) = survey.effective_endpoints(shot);
        let Some(to_name) = to_name else {
            continue;
        };
        let (Some(from), Some(to)) = (stations.get(&from_name), stations.get(&to_name)) else {
            continue;
        };

        let sextuple = [
            from.position.x,
            from.position.y,
            from.position.z,
            to.position.x,
            to.position.y,
            to.position.z,
        ];
        match shot.shot_type {
            ShotType::Center => segments.center.push(sextuple),
            ShotType::Splay => segments.splay.push(sextuple),
            ShotType::Auxiliary => segments.auxiliary.push(sextuple),
        }
    }
    segments
}
