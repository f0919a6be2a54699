//! # Network reconstruction engine
//!
//! Turns a survey's polar shots into absolute 3D station positions by a
//! worklist fixed-point iteration over the cave-wide shared station map.
//!
//! Each pass walks the survey's valid shots and tries to grow the placed
//! set: a shot with exactly one placed endpoint places the other end, a
//! shot with both ends placed is linked (and possibly flagged redundant),
//! a shot with neither end placed may still resolve through a cross-survey
//! alias. Passes repeat until one of them makes no progress; whatever is
//! left unprocessed is orphaned. The engine never throws for disconnected
//! or malformed data — those become diagnostic sets on the survey. The
//! only fatal condition is re-placing an already-placed station name,
//! which the checked [`StationMap::insert`] guards.
//!
//! Coordinate propagation rides along: a station placed from an anchor
//! that carries a projected coordinate inherits the anchor's coordinate
//! shifted by the same displacement, and its geographic coordinate is
//! derived through the cave's coordinate system converter.

use ahash::AHashSet;
use log::{debug, info};
use nalgebra::Vector3;
use smallvec::smallvec;

use crate::constants::{ShotRef, ShotRefs, StationName};
use crate::geodesy::{to_lat_lon, CoordinateSystem, ProjectedCoordinate};
use crate::geometry::{adjusted_bearing, polar_displacement};
use crate::karst_errors::KarstError;
use crate::model::station::{StationCoordinates, StationMap, SurveyStation};
use crate::model::survey::Survey;
use crate::model::{AliasSubstitution, Shot, ShotType, SurveyAlias};

/// Seed placement for the first survey of a cave: the start station's
/// position in the local frame, plus the projected coordinate of a
/// matching fix point when the cave is geo-referenced.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub position: Vector3<f64>,
    pub projected: Option<ProjectedCoordinate>,
}

/// Which way a shot is traversed when placing its unplaced end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// `from` is the anchor, the far end gets placed.
    Forward,
    /// `to` is the anchor, `from` gets placed with the negated displacement.
    Backward,
}

/// Reconstruct one survey against the cave-wide station map.
///
/// Arguments
/// ---------
/// * `survey`: the survey to place; its `start` and diagnostic sets are
///   updated in place
/// * `stations`: the shared station map, holding whatever earlier surveys
///   of the cave already placed
/// * `aliases`: cross-survey station equivalences, consulted only when
///   direct name matching fails
/// * `processed_legs`: cave-wide registry of endpoint pairs already carried
///   by a processed shot, backing duplicate detection across surveys
/// * `coordinate_system`: grid of the cave's fix points, for geographic
///   conversion of propagated coordinates
/// * `seed`: seed placement, supplied for the first survey of a cave only
///
/// Return
/// ------
/// * `Ok(())` on any input data, however disconnected; `Err` only for a
///   genuine internal invariant violation (duplicate station placement)
pub fn reconstruct(
    survey: &mut Survey,
    stations: &mut StationMap,
    aliases: &[SurveyAlias],
    processed_legs: &mut AHashSet<(StationName, StationName)>,
    coordinate_system: Option<CoordinateSystem>,
    seed: Option<&Seed>,
) -> Result<(), KarstError> {
    survey.clear_diagnostics();

    let valid: Vec<Shot> = survey.valid_shots().into_iter().cloned().collect();
    if valid.is_empty() {
        debug!("survey '{}': no valid shots, nothing to place", survey.name);
        return Ok(());
    }

    let Some(start) = survey.start_station() else {
        return Ok(());
    };
    survey.start = Some(start.clone());

    let declination = survey.metadata.declination.unwrap_or(0.0);
    let convergence = survey.metadata.convergence.unwrap_or(0.0);
    let local_origin = seed.map(|s| s.position).unwrap_or_else(Vector3::zeros);

    if let Some(seed) = seed {
        if !stations.contains(&start) {
            let geographic = match (&seed.projected, &coordinate_system) {
                (Some(projected), Some(system)) => Some(to_lat_lon(projected, system)),
                _ => None,
            };
            stations.insert(
                start.clone(),
                SurveyStation {
                    shot_type: ShotType::Center,
                    position: seed.position,
                    coordinates: StationCoordinates {
                        local: Vector3::zeros(),
                        projected: seed.projected,
                        geographic,
                    },
                    survey: survey.name.clone(),
                    shots: ShotRefs::new(),
                },
                &start,
                "",
            )?;
            debug!("survey '{}': seeded start station '{start}'", survey.name);
        }
    }

    let mut processed = vec![false; valid.len()];
    loop {
        let mut progressed = false;
        for (index, shot) in valid.iter().enumerate() {
            if processed[index] {
                continue;
            }
            let done = process_shot(
                shot,
                survey,
                stations,
                aliases,
                processed_legs,
                coordinate_system,
                declination,
                convergence,
                &local_origin,
            )?;
            if done {
                processed[index] = true;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    for (index, shot) in valid.iter().enumerate() {
        if !processed[index] {
            survey.orphan_shot_ids.insert(shot.id);
        }
    }
    survey.isolated = processed.iter().all(|done| !*done);

    info!(
        "survey '{}': {} shots placed, {} orphaned, {} duplicate{}",
        survey.name,
        processed.iter().filter(|done| **done).count(),
        survey.orphan_shot_ids.len(),
        survey.duplicate_shot_ids.len(),
        if survey.isolated { " (isolated)" } else { "" }
    );
    Ok(())
}

/// Try to process one shot. Returns `Ok(true)` when the shot got placed or
/// linked this pass, `Ok(false)` when it has to wait for more stations.
#[allow(clippy::too_many_arguments)]
fn process_shot(
    shot: &Shot,
    survey: &mut Survey,
    stations: &mut StationMap,
    aliases: &[SurveyAlias],
    processed_legs: &mut AHashSet<(StationName, StationName)>,
    coordinate_system: Option<CoordinateSystem>,
    declination: f64,
    convergence: f64,
    local_origin: &Vector3<f64>,
) -> Result<bool, KarstError> {
    let from_name = shot.from.clone();
    let to_name = shot.target_station_name(&survey.name);

    let from_placed = stations.contains(&from_name);
    let to_placed = to_name
        .as_deref()
        .is_some_and(|name| stations.contains(name));

    match (from_placed, to_placed) {
        (true, false) => {
            let Some(new_name) = to_name else {
                // A non-splay shot without a target has nothing to place.
                return Ok(false);
            };
            let placed = place_station(
                shot,
                survey,
                stations,
                coordinate_system,
                declination,
                convergence,
                local_origin,
                &from_name,
                &new_name,
                Direction::Forward,
            )?;
            if placed && !shot.is_splay() {
                processed_legs.insert(leg_key(&from_name, &new_name));
            }
            Ok(placed)
        }
        (false, true) => {
            let Some(to_name) = to_name else {
                return Ok(false);
            };
            let placed = place_station(
                shot,
                survey,
                stations,
                coordinate_system,
                declination,
                convergence,
                local_origin,
                &to_name,
                &from_name,
                Direction::Backward,
            )?;
            if placed && !shot.is_splay() {
                processed_legs.insert(leg_key(&from_name, &to_name));
            }
            Ok(placed)
        }
        (true, true) => {
            let Some(to_name) = to_name else {
                return Ok(false);
            };
            link_shot(shot, survey, stations, processed_legs, &from_name, &to_name);
            Ok(true)
        }
        (false, false) => resolve_through_alias(
            shot,
            survey,
            stations,
            aliases,
            processed_legs,
            coordinate_system,
            declination,
            convergence,
            local_origin,
            &from_name,
            to_name.as_deref(),
        ),
    }
}

/// Place the unplaced end of a shot relative to its anchor station.
///
/// Returns `Ok(false)` without touching anything when the anchor is not
/// eligible: an auxiliary station cannot anchor a center or splay shot.
#[allow(clippy::too_many_arguments)]
fn place_station(
    shot: &Shot,
    survey: &mut Survey,
    stations: &mut StationMap,
    coordinate_system: Option<CoordinateSystem>,
    declination: f64,
    convergence: f64,
    local_origin: &Vector3<f64>,
    anchor_name: &str,
    new_name: &str,
    direction: Direction,
) -> Result<bool, KarstError> {
    let Some(anchor) = stations.get(anchor_name) else {
        return Ok(false);
    };
    if anchor.shot_type == ShotType::Auxiliary && shot.shot_type != ShotType::Auxiliary {
        return Ok(false);
    }
    let anchor_position = anchor.position;
    let anchor_projected = anchor.coordinates.projected;

    let bearing = adjusted_bearing(shot.azimuth, declination, convergence);
    let displacement = polar_displacement(shot.length, bearing, shot.clino);
    let displacement = match direction {
        Direction::Forward => displacement,
        Direction::Backward => -displacement,
    };

    let position = anchor_position + displacement;
    let projected = anchor_projected.map(|p| p.translated(&displacement));
    let geographic = match (&projected, &coordinate_system) {
        (Some(projected), Some(system)) => Some(to_lat_lon(projected, system)),
        _ => None,
    };

    stations.insert(
        new_name.to_string(),
        SurveyStation {
            shot_type: shot.shot_type,
            position,
            coordinates: StationCoordinates {
                local: position - local_origin,
                projected,
                geographic,
            },
            survey: survey.name.clone(),
            shots: smallvec![ShotRef::new(survey.name.clone(), shot.id)],
        },
        &shot.from,
        shot.effective_to().unwrap_or(""),
    )?;

    if let Some(anchor) = stations.get_mut(anchor_name) {
        anchor.shots.push(ShotRef::new(survey.name.clone(), shot.id));
    }
    Ok(true)
}

/// Handle a shot whose both endpoints are already placed: a redundant
/// connection. It is flagged as duplicate unless an identical leg (either
/// direction) was already processed in this or an earlier survey of the
/// cave; either way the shot counts as processed and no station moves.
fn link_shot(
    shot: &Shot,
    survey: &mut Survey,
    stations: &mut StationMap,
    processed_legs: &mut AHashSet<(StationName, StationName)>,
    from_name: &str,
    to_name: &str,
) {
    if !shot.is_splay() {
        let key = leg_key(from_name, to_name);
        if !processed_legs.contains(&key) {
            debug!(
                "survey '{}': shot {} redundantly connects '{from_name}' and '{to_name}'",
                survey.name, shot.id
            );
            survey.duplicate_shot_ids.insert(shot.id);
        }
        processed_legs.insert(key);
    }
    for name in [from_name, to_name] {
        if let Some(station) = stations.get_mut(name) {
            station.shots.push(ShotRef::new(survey.name.clone(), shot.id));
        }
    }
}

/// Neither endpoint is placed directly: try to resolve one of them through
/// the alias list. An alias applies when its other endpoint is already in
/// the station map; the substitution used is recorded on the survey.
#[allow(clippy::too_many_arguments)]
fn resolve_through_alias(
    shot: &Shot,
    survey: &mut Survey,
    stations: &mut StationMap,
    aliases: &[SurveyAlias],
    processed_legs: &mut AHashSet<(StationName, StationName)>,
    coordinate_system: Option<CoordinateSystem>,
    declination: f64,
    convergence: f64,
    local_origin: &Vector3<f64>,
    from_name: &str,
    to_name: Option<&str>,
) -> Result<bool, KarstError> {
    if let Some(partner) = placed_partner(aliases, stations, from_name) {
        let Some(new_name) = to_name else {
            return Ok(false);
        };
        let placed = place_station(
            shot,
            survey,
            stations,
            coordinate_system,
            declination,
            convergence,
            local_origin,
            &partner,
            new_name,
            Direction::Forward,
        )?;
        if placed {
            survey.alias_substitutions.insert(
                shot.id,
                AliasSubstitution {
                    from: Some(partner.clone()),
                    to: None,
                },
            );
            if !shot.is_splay() {
                processed_legs.insert(leg_key(&partner, new_name));
            }
        }
        return Ok(placed);
    }

    if let Some(partner) = to_name.and_then(|name| placed_partner(aliases, stations, name)) {
        let placed = place_station(
            shot,
            survey,
            stations,
            coordinate_system,
            declination,
            convergence,
            local_origin,
            &partner,
            from_name,
            Direction::Backward,
        )?;
        if placed {
            survey.alias_substitutions.insert(
                shot.id,
                AliasSubstitution {
                    from: None,
                    to: Some(partner.clone()),
                },
            );
            if !shot.is_splay() {
                processed_legs.insert(leg_key(from_name, &partner));
            }
        }
        return Ok(placed);
    }

    Ok(false)
}

/// The alias partner of `name` that is already placed, if any alias in the
/// list names `name` on either side.
fn placed_partner(
    aliases: &[SurveyAlias],
    stations: &StationMap,
    name: &str,
) -> Option<StationName> {
    aliases
        .iter()
        .find_map(|alias| alias.other(name).filter(|partner| stations.contains(partner)))
        .map(str::to_string)
}

/// Normalized endpoint pair of a leg: unordered, so a re-measured shot
/// matches whichever direction it was first recorded in.
fn leg_key(a: &str, b: &str) -> (StationName, StationName) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod reconstruction_unit_test {
    use super::*;

    #[test]
    fn leg_key_is_direction_independent() {
        assert_eq!(leg_key("A", "B"), leg_key("B", "A"));
        assert_eq!(leg_key("A", "B"), ("A".to_string(), "B".to_string()));
    }
}
