//! Magnetic declination lookup against the NOAA geomagnetism service.
//!
//! A thin request/parse layer over [`KarstEnv`](crate::env_state::KarstEnv);
//! the caching and the degrade-to-unavailable policy live in the
//! [`Karst`](crate::karst::Karst) façade. The reconstruction engine never
//! calls into here — it only reads whatever declination was stored on the
//! survey metadata.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::constants::Degree;
use crate::env_state::KarstEnv;
use crate::karst_errors::KarstError;

const NOAA_DECLINATION_URL: &str =
    "https://www.ngdc.noaa.gov/geomag-web/calculators/calculateDeclination";

#[derive(Debug, Deserialize)]
struct DeclinationResponse {
    result: Vec<DeclinationResult>,
}

#[derive(Debug, Deserialize)]
struct DeclinationResult {
    declination: f64,
}

/// Fetch the magnetic declination for a position and date.
///
/// Arguments
/// ---------
/// * `env`: environment holding the HTTP client
/// * `latitude`/`longitude`: WGS84 position in degrees
/// * `date`: date of the survey trip the declination applies to
///
/// Return
/// ------
/// * declination in degrees (east positive), or an error the caller is
///   expected to degrade to "unavailable"
pub(crate) fn fetch_declination(
    env: &KarstEnv,
    latitude: Degree,
    longitude: Degree,
    date: NaiveDate,
) -> Result<Degree, KarstError> {
    let url = format!(
        "{NOAA_DECLINATION_URL}?lat1={latitude}&lon1={longitude}\
         &startYear={}&startMonth={}&startDay={}&resultFormat=json",
        date.year(),
        date.month(),
        date.day()
    );
    let body = env.get_from_url(&url)?;
    parse_declination(&body)
}

fn parse_declination(body: &str) -> Result<Degree, KarstError> {
    let response: DeclinationResponse = serde_json::from_str(body)?;
    response
        .result
        .first()
        .map(|r| r.declination)
        .ok_or_else(|| KarstError::DeclinationUnavailable("empty result list".to_string()))
}
