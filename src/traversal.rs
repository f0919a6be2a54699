//! Distance-from-start traversal over the resolved station graph.
//!
//! Builds an undirected weighted graph — vertices are station names, edges
//! are valid shots weighted by their length — and runs a single-source
//! shortest-path traversal from the first survey's start station. The
//! result drives the distance-based color gradient; it never affects
//! placement.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use itertools::Itertools;
use ordered_float::NotNan;

use crate::constants::{Meter, StationName};
use crate::model::cave::Cave;

/// Shortest traversed distance from the cave's start to every reachable
/// station, in meters. Unreachable stations are absent from the map.
///
/// Arguments
/// ---------
/// * `cave`: a reconstructed cave; edges are taken from every survey's
///   valid shots, using the alias substitutions of the last reconstruction
///
/// Return
/// ------
/// * map of station name → distance; empty when the cave has no start
pub fn distances_from_start(cave: &Cave) -> AHashMap<StationName, Meter> {
    let Some(start) = cave.surveys.first().and_then(|s| s.start_station()) else {
        return AHashMap::new();
    };

    // Adjacency over placed endpoints only; a shot with an unresolved end
    // contributes no edge.
    let mut adjacency: AHashMap<StationName, Vec<(StationName, Meter)>> = AHashMap::new();
    for survey in &cave.surveys {
        for shot in survey.valid_shots() {
            let (from, to) = survey.effective_endpoints(shot);
            let Some(to) = to else {
                continue;
            };
            if !cave.stations.contains(&from) || !cave.stations.contains(&to) {
                continue;
            }
            adjacency
                .entry(from.clone())
                .or_default()
                .push((to.clone(), shot.length));
            adjacency.entry(to).or_default().push((from, shot.length));
        }
    }

    let mut distances: AHashMap<StationName, Meter> = AHashMap::new();
    let Ok(zero) = NotNan::new(0.0) else {
        return distances;
    };

    let mut queue = BinaryHeap::new();
    distances.insert(start.clone(), 0.0);
    queue.push(Reverse((zero, start)));

    while let Some(Reverse((distance, name))) = queue.pop() {
        let distance = distance.into_inner();
        if distances.get(&name).is_some_and(|best| *best < distance) {
            continue;
        }
        let Some(neighbors) = adjacency.get(&name) else {
            continue;
        };
        for (next, length) in neighbors {
            let candidate = distance + length;
            let improved = distances
                .get(next)
                .is_none_or(|best| candidate < *best);
            if improved {
                distances.insert(next.clone(), candidate);
                if let Ok(priority) = NotNan::new(candidate) {
                    queue.push(Reverse((priority, next.clone())));
                }
            }
        }
    }
    distances
}

/// Normalize a distance map to the 0–100 range consumed by the color
/// gradient. An all-zero or empty map normalizes to zeros.
pub fn relative_distances(distances: &AHashMap<StationName, Meter>) -> AHashMap<StationName, f64> {
    let max = distances
        .values()
        .copied()
        .fold(0.0_f64, f64::max);
    distances
        .iter()
        .map(|(name, distance)| {
            let relative = if max > 0.0 { distance / max * 100.0 } else { 0.0 };
            (name.clone(), relative)
        })
        .collect()
}

/// Relative depth (0 at the cave's highest placed station, 100 at the
/// deepest) for every station in the map, for the depth-based gradient.
pub fn relative_depths(cave: &Cave) -> AHashMap<StationName, f64> {
    let Some((top, bottom)) = cave
        .stations
        .iter()
        .map(|(_, station)| station.position.z)
        .minmax()
        .into_option()
        .map(|(min, max)| (max, min))
    else {
        return AHashMap::new();
    };

    let span = top - bottom;
    cave.stations
        .iter()
        .map(|(name, station)| {
            let depth = if span > 0.0 {
                (top - station.position.z) / span * 100.0
            } else {
                0.0
            };
            (name.clone(), depth)
        })
        .collect()
}
