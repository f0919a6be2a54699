//! # Karst: environment and external-data façade
//!
//! This module defines the [`Karst`](crate::karst::Karst) struct, the
//! context wiring together:
//!
//! 1. **Environment state** ([`KarstEnv`](crate::env_state::KarstEnv)) —
//!    the persistent HTTP client.
//! 2. **Magnetic declination lookups** — cached, best-effort queries
//!    against the NOAA geomagnetism service, used to prefill survey
//!    metadata before reconstruction.
//!
//! The design emphasizes *idempotent caching*: a declination is fetched at
//! most once per (rounded position, date) key, and a failed lookup is
//! cached as unavailable rather than retried — the reconstruction path
//! must never block on, or fail because of, external I/O.

use ahash::AHashMap;
use chrono::NaiveDate;
use log::warn;

use crate::constants::Degree;
use crate::declination::fetch_declination;
use crate::env_state::KarstEnv;

/// Cache key for declination lookups: position rounded to 0.1 degree
/// (well below the accuracy a hand-held compass can use) plus the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DeclinationKey {
    lat_tenths: i32,
    lon_tenths: i32,
    date: NaiveDate,
}

impl DeclinationKey {
    fn new(latitude: Degree, longitude: Degree, date: NaiveDate) -> Self {
        DeclinationKey {
            lat_tenths: (latitude * 10.0).round() as i32,
            lon_tenths: (longitude * 10.0).round() as i32,
            date,
        }
    }
}

/// Context object owning the environment and the declination cache.
#[derive(Debug, Clone, Default)]
pub struct Karst {
    env_state: KarstEnv,
    declination_cache: AHashMap<DeclinationKey, Option<Degree>>,
}

impl Karst {
    pub fn new() -> Self {
        Karst {
            env_state: KarstEnv::new(),
            declination_cache: AHashMap::new(),
        }
    }

    /// Magnetic declination at a position and date, cached.
    ///
    /// Arguments
    /// ---------
    /// * `latitude`/`longitude`: WGS84 position in degrees
    /// * `date`: survey trip date
    ///
    /// Return
    /// ------
    /// * declination in degrees, or `None` when the service is
    ///   unreachable or its response cannot be parsed — the failure is
    ///   cached and not retried within this context's lifetime
    pub fn declination(
        &mut self,
        latitude: Degree,
        longitude: Degree,
        date: NaiveDate,
    ) -> Option<Degree> {
        let key = DeclinationKey::new(latitude, longitude, date);
        if let Some(cached) = self.declination_cache.get(&key) {
            return *cached;
        }

        let looked_up = match fetch_declination(&self.env_state, latitude, longitude, date) {
            Ok(declination) => Some(declination),
            Err(err) => {
                warn!("declination lookup failed for ({latitude}, {longitude}): {err}");
                None
            }
        };
        self.declination_cache.insert(key, looked_up);
        looked_up
    }
}
