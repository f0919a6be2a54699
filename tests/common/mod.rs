use karst::model::cave::Cave;
use karst::model::survey::Survey;
use karst::model::{Shot, ShotType};

/// A center shot with level inclination unless stated otherwise.
pub fn center(id: u32, from: &str, to: &str, length: f64, azimuth: f64, clino: f64) -> Shot {
    Shot::new(
        id,
        ShotType::Center,
        from,
        Some(to.to_string()),
        length,
        azimuth,
        clino,
    )
}

pub fn survey_with_shots(name: &str, shots: Vec<Shot>) -> Survey {
    let mut survey = Survey::new(name);
    survey.shots = shots;
    survey
}

pub fn cave_with_survey(name: &str, survey: Survey) -> Cave {
    let mut cave = Cave::new(name);
    cave.add_survey(survey).unwrap();
    cave
}
