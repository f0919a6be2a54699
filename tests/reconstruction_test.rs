mod common;

use ahash::AHashSet;
use approx::assert_relative_eq;
use nalgebra::Vector3;

use karst::geodesy::{CoordinateSystem, ProjectedCoordinate};
use karst::model::cave::{Cave, FixPoint, GeoData};
use karst::model::{Shot, ShotType, SurveyAlias};
use karst::reconstruction::{reconstruct, Seed};

use common::{cave_with_survey, center, survey_with_shots};

#[test]
fn unseeded_survey_stays_isolated() {
    // One shot, no seed: nothing can be placed, the shot is orphaned.
    let mut survey = survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 0.0, 0.0)]);
    let mut stations = karst::model::station::StationMap::new();
    let mut legs = AHashSet::new();

    reconstruct(&mut survey, &mut stations, &[], &mut legs, None, None).unwrap();

    assert!(stations.is_empty());
    assert!(survey.orphan_shot_ids.contains(&0));
    assert!(survey.isolated);
    assert_eq!(survey.start.as_deref(), Some("A"));
}

#[test]
fn seeded_single_shot_places_both_stations() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 0.0, 0.0)]),
    );
    cave.reconstruct_all().unwrap();

    let a = cave.stations.get("A").unwrap();
    let b = cave.stations.get("B").unwrap();
    assert_relative_eq!(a.position.x, 0.0);
    assert_relative_eq!(a.position.y, 0.0);
    assert_relative_eq!(b.position.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(b.position.y, 10.0, epsilon = 1e-12);
    assert_relative_eq!(b.position.z, 0.0, epsilon = 1e-12);

    let survey = &cave.surveys[0];
    assert!(survey.orphan_shot_ids.is_empty());
    assert!(!survey.isolated);
}

#[test]
fn reversed_leg_is_accepted_not_duplicated() {
    // Shot 1 re-measures the same leg backwards: both endpoints are placed
    // and the leg is already known, so it is silently accepted.
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 0.0, 0.0),
                center(1, "B", "A", 10.0, 180.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    let survey = &cave.surveys[0];
    assert!(survey.orphan_shot_ids.is_empty());
    assert!(survey.duplicate_shot_ids.is_empty());
    assert!(!survey.isolated);
    assert_eq!(cave.stations.len(), 2);
}

#[test]
fn loop_closing_shot_is_flagged_duplicate() {
    // A-B-C triangle: the third edge connects two already-placed stations
    // over a leg never measured before.
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 0.0, 0.0),
                center(1, "B", "C", 10.0, 90.0, 0.0),
                center(2, "A", "C", 14.0, 45.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    let survey = &cave.surveys[0];
    assert_eq!(
        survey.duplicate_shot_ids.iter().copied().collect::<Vec<_>>(),
        vec![2]
    );
    assert!(survey.orphan_shot_ids.is_empty());
    // The duplicate does not move anything: C stays where shot 1 put it.
    let c = cave.stations.get("C").unwrap();
    assert_relative_eq!(c.position.x, 10.0, epsilon = 1e-12);
    assert_relative_eq!(c.position.y, 10.0, epsilon = 1e-12);
}

#[test]
fn cross_survey_alias_resolves_the_target() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots("s1", vec![center(0, "P", "X", 10.0, 0.0, 0.0)]),
    );
    cave.add_survey(survey_with_shots(
        "s2",
        vec![center(0, "A", "B", 5.0, 90.0, 0.0)],
    ))
    .unwrap();
    cave.aliases.push(SurveyAlias::new("X", "B"));

    cave.reconstruct_all().unwrap();

    // B resolved through the alias: no station B, A hangs off X.
    assert!(!cave.stations.contains("B"));
    let x = cave.stations.get("X").unwrap();
    let a = cave.stations.get("A").unwrap();
    assert_relative_eq!(a.position.x, x.position.x - 5.0, epsilon = 1e-12);
    assert_relative_eq!(a.position.y, x.position.y, epsilon = 1e-9);

    let s2 = cave.survey("s2").unwrap();
    assert!(s2.orphan_shot_ids.is_empty());
    assert!(!s2.isolated);
    let substitution = s2.alias_substitutions.get(&0).unwrap();
    assert_eq!(substitution.from, None);
    assert_eq!(substitution.to.as_deref(), Some("X"));
}

#[test]
fn disconnected_second_survey_is_isolated() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 0.0, 0.0)]),
    );
    cave.add_survey(survey_with_shots(
        "s2",
        vec![center(0, "E", "F", 4.0, 0.0, 0.0)],
    ))
    .unwrap();

    cave.reconstruct_all().unwrap();

    let s2 = cave.survey("s2").unwrap();
    assert!(s2.isolated);
    assert_eq!(
        s2.orphan_shot_ids.iter().copied().collect::<Vec<_>>(),
        vec![0]
    );
    assert!(!cave.stations.contains("E"));
    assert!(!cave.stations.contains("F"));
}

#[test]
fn partially_connected_survey_orphans_the_rest() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 0.0, 0.0),
                center(1, "C", "D", 5.0, 0.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    let survey = &cave.surveys[0];
    // Orphans and processed shots partition the valid set.
    assert_eq!(
        survey.orphan_shot_ids.iter().copied().collect::<Vec<_>>(),
        vec![1]
    );
    assert!(!survey.isolated);
    assert_eq!(cave.stations.len(), 2);
}

#[test]
fn auxiliary_station_cannot_anchor_center_shots() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 0.0, 0.0),
                Shot::new(
                    1,
                    ShotType::Auxiliary,
                    "B",
                    Some("C".to_string()),
                    5.0,
                    90.0,
                    0.0,
                ),
                // C is auxiliary: it may anchor another auxiliary shot...
                Shot::new(
                    2,
                    ShotType::Auxiliary,
                    "C",
                    Some("D".to_string()),
                    5.0,
                    90.0,
                    0.0,
                ),
                // ...but not a center shot, which stays orphaned.
                center(3, "C", "E", 5.0, 0.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    let survey = &cave.surveys[0];
    assert_eq!(cave.stations.get("C").unwrap().shot_type, ShotType::Auxiliary);
    assert!(cave.stations.contains("D"));
    assert!(!cave.stations.contains("E"));
    assert_eq!(
        survey.orphan_shot_ids.iter().copied().collect::<Vec<_>>(),
        vec![3]
    );
}

#[test]
fn auxiliary_rule_applies_to_backward_placement_too() {
    // F would be placed backwards from the auxiliary station C.
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                Shot::new(
                    0,
                    ShotType::Auxiliary,
                    "A",
                    Some("C".to_string()),
                    5.0,
                    90.0,
                    0.0,
                ),
                center(1, "F", "C", 5.0, 0.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    assert!(!cave.stations.contains("F"));
    assert!(cave.surveys[0].orphan_shot_ids.contains(&1));
}

#[test]
fn splay_stations_get_synthesized_names() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 0.0, 0.0),
                Shot::new(7, ShotType::Splay, "B", None, 2.0, 90.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    let splay = cave.stations.get("splay-7@s1").unwrap();
    assert_eq!(splay.shot_type, ShotType::Splay);
    assert_relative_eq!(splay.position.x, 2.0, epsilon = 1e-12);
    assert_relative_eq!(splay.position.y, 10.0, epsilon = 1e-9);
}

#[test]
fn declination_and_convergence_adjust_the_bearing() {
    let mut survey = survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 30.0, 0.0)]);
    survey.metadata.declination = Some(2.0);
    survey.metadata.convergence = Some(1.0);
    let mut cave = cave_with_survey("test", survey);
    cave.reconstruct_all().unwrap();

    // Effective bearing 30 + 2 - 1 = 31 degrees.
    let b = cave.stations.get("B").unwrap();
    let bearing = 31f64.to_radians();
    assert_relative_eq!(b.position.x, 10.0 * bearing.sin(), epsilon = 1e-12);
    assert_relative_eq!(b.position.y, 10.0 * bearing.cos(), epsilon = 1e-12);
}

#[test]
fn conservation_holds_for_every_placed_station() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 40.0, 10.0),
                center(1, "B", "C", 7.5, 120.0, -5.0),
                center(2, "C", "D", 3.25, 300.0, 45.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    for (from, to, length, azimuth, clino) in [
        ("A", "B", 10.0, 40.0, 10.0),
        ("B", "C", 7.5, 120.0, -5.0),
        ("C", "D", 3.25, 300.0, 45.0),
    ] {
        let from = cave.stations.get(from).unwrap();
        let to = cave.stations.get(to).unwrap();
        let displacement = karst::geometry::polar_displacement(length, azimuth, clino);
        let expected = from.position + displacement;
        assert_relative_eq!(to.position.x, expected.x, epsilon = 1e-12);
        assert_relative_eq!(to.position.y, expected.y, epsilon = 1e-12);
        assert_relative_eq!(to.position.z, expected.z, epsilon = 1e-12);
    }
}

#[test]
fn reconstruction_is_idempotent() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 40.0, 10.0),
                center(1, "B", "C", 7.5, 120.0, -5.0),
                center(2, "C", "A", 15.0, 250.0, 0.0),
                center(3, "Z", "W", 5.0, 0.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();
    let first: Vec<_> = {
        let mut entries: Vec<_> = cave
            .stations
            .iter()
            .map(|(name, s)| (name.clone(), s.position))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    };
    let orphans = cave.surveys[0].orphan_shot_ids.clone();
    let duplicates = cave.surveys[0].duplicate_shot_ids.clone();

    cave.reconstruct_all().unwrap();
    let mut second: Vec<_> = cave
        .stations
        .iter()
        .map(|(name, s)| (name.clone(), s.position))
        .collect();
    second.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(first, second);
    assert_eq!(orphans, cave.surveys[0].orphan_shot_ids);
    assert_eq!(duplicates, cave.surveys[0].duplicate_shot_ids);
}

#[test]
fn shot_order_does_not_change_the_result() {
    let shots = vec![
        center(0, "A", "B", 10.0, 40.0, 10.0),
        center(1, "B", "C", 7.5, 120.0, -5.0),
        center(2, "C", "D", 3.25, 300.0, 45.0),
        center(3, "Q", "R", 5.0, 0.0, 0.0),
    ];
    let mut reversed = shots.clone();
    reversed.reverse();

    let mut cave_a = cave_with_survey("test", {
        let mut s = survey_with_shots("s1", shots);
        s.start = Some("A".to_string());
        s
    });
    let mut cave_b = cave_with_survey("test", {
        let mut s = survey_with_shots("s1", reversed);
        s.start = Some("A".to_string());
        s
    });
    cave_a.reconstruct_all().unwrap();
    cave_b.reconstruct_all().unwrap();

    for name in ["A", "B", "C", "D"] {
        let a = cave_a.stations.get(name).unwrap();
        let b = cave_b.stations.get(name).unwrap();
        assert_relative_eq!(a.position.x, b.position.x, epsilon = 1e-12);
        assert_relative_eq!(a.position.y, b.position.y, epsilon = 1e-12);
        assert_relative_eq!(a.position.z, b.position.z, epsilon = 1e-12);
    }
    assert_eq!(
        cave_a.surveys[0].orphan_shot_ids,
        cave_b.surveys[0].orphan_shot_ids
    );
}

#[test]
fn fix_point_propagates_projected_and_geographic_coordinates() {
    let mut survey = survey_with_shots(
        "s1",
        vec![
            center(0, "A", "B", 100.0, 90.0, 0.0),
            center(1, "B", "C", 50.0, 0.0, 30.0),
        ],
    );
    survey.start = Some("A".to_string());
    let mut cave = cave_with_survey("test", survey);
    cave.geo_data = Some(GeoData {
        coordinate_system: CoordinateSystem::Eov,
        fix_points: vec![FixPoint {
            station: "A".to_string(),
            coordinate: ProjectedCoordinate::new(650_000.0, 200_000.0, 150.0),
        }],
    });

    cave.reconstruct_all().unwrap();

    let a = cave.stations.get("A").unwrap();
    let b = cave.stations.get("B").unwrap();
    let c = cave.stations.get("C").unwrap();

    let pa = a.coordinates.projected.unwrap();
    let pb = b.coordinates.projected.unwrap();
    let pc = c.coordinates.projected.unwrap();
    assert_relative_eq!(pb.easting, pa.easting + 100.0, epsilon = 1e-9);
    assert_relative_eq!(pb.northing, pa.northing, epsilon = 1e-9);
    assert_relative_eq!(pc.northing, pb.northing + 50.0 * 30f64.to_radians().cos(), epsilon = 1e-9);
    assert_relative_eq!(pc.elevation, 150.0 + 50.0 * 30f64.to_radians().sin(), epsilon = 1e-9);

    // Geographic coordinates ride along, east of the fix point.
    let ga = a.coordinates.geographic.unwrap();
    let gb = b.coordinates.geographic.unwrap();
    assert!(gb.longitude > ga.longitude);
    assert_relative_eq!(gb.latitude, ga.latitude, epsilon = 1e-4);
}

#[test]
fn stations_without_fix_ancestor_have_no_projected_coordinates() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 0.0, 0.0)]),
    );
    cave.reconstruct_all().unwrap();

    for name in ["A", "B"] {
        let station = cave.stations.get(name).unwrap();
        assert!(station.coordinates.projected.is_none());
        assert!(station.coordinates.geographic.is_none());
    }
}

#[test]
fn empty_survey_is_a_no_op() {
    let mut cave = cave_with_survey("test", survey_with_shots("s1", Vec::new()));
    cave.reconstruct_all().unwrap();
    assert!(cave.stations.is_empty());
    let survey = &cave.surveys[0];
    assert!(!survey.isolated);
    assert!(survey.orphan_shot_ids.is_empty());
}

#[test]
fn invalid_shots_are_excluded_from_placement() {
    let mut bad = center(1, "B", "C", 5.0, 0.0, 0.0);
    bad.length = -5.0;
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 0.0, 0.0), bad]),
    );
    cave.reconstruct_all().unwrap();

    assert!(!cave.stations.contains("C"));
    // Invalid shots are not part of the valid set, so not orphaned either.
    assert!(cave.surveys[0].orphan_shot_ids.is_empty());
}

#[test]
fn back_references_connect_stations_to_their_shots() {
    let mut cave = cave_with_survey(
        "test",
        survey_with_shots(
            "s1",
            vec![
                center(0, "A", "B", 10.0, 0.0, 0.0),
                center(1, "B", "C", 5.0, 90.0, 0.0),
            ],
        ),
    );
    cave.reconstruct_all().unwrap();

    let b = cave.stations.get("B").unwrap();
    let ids: Vec<u32> = b.shots.iter().map(|r| r.shot_id).collect();
    assert!(ids.contains(&0));
    assert!(ids.contains(&1));
    assert!(b.shots.iter().all(|r| r.survey == "s1"));
}

#[test]
fn direct_engine_call_with_custom_seed() {
    // The engine itself accepts an arbitrary seed position; the cave entry
    // point always passes the origin.
    let mut survey = survey_with_shots("s1", vec![center(0, "A", "B", 10.0, 0.0, 0.0)]);
    let mut stations = karst::model::station::StationMap::new();
    let mut legs = AHashSet::new();
    let seed = Seed {
        position: Vector3::new(5.0, 5.0, 5.0),
        projected: None,
    };

    reconstruct(&mut survey, &mut stations, &[], &mut legs, None, Some(&seed)).unwrap();

    let b = stations.get("B").unwrap();
    assert_relative_eq!(b.position.y, 15.0, epsilon = 1e-12);
    // Local coordinates stay relative to the seed.
    assert_relative_eq!(b.coordinates.local.y, 10.0, epsilon = 1e-12);
    assert_relative_eq!(b.coordinates.local.x, 0.0, epsilon = 1e-12);
}
