//! Plain-data export/import of cave projects.
//!
//! Everything the data model owns round-trips through `serde_json`: survey
//! dates as epoch milliseconds, stations with their full coordinate
//! triple. The engine's internal leg registry is deliberately not part of
//! the format — a loaded cave is expected to be recomputed with
//! [`Cave::reconstruct_all`](crate::model::cave::Cave::reconstruct_all)
//! before its derived state is trusted.

use camino::Utf8Path;

use crate::karst_errors::KarstError;
use crate::model::cave::Cave;

/// Export a cave to a plain JSON value.
///
/// Arguments
/// ---------
/// * `cave`: the cave to export
///
/// Return
/// ------
/// * a `serde_json::Value` preserving every model field exactly
pub fn to_export(cave: &Cave) -> Result<serde_json::Value, KarstError> {
    Ok(serde_json::to_value(cave)?)
}

/// Rebuild a cave from a plain JSON value produced by [`to_export`].
pub fn from_export(value: serde_json::Value) -> Result<Cave, KarstError> {
    Ok(serde_json::from_value(value)?)
}

/// Write a cave project file.
///
/// Arguments
/// ---------
/// * `cave`: the cave to save
/// * `path`: destination file path
pub fn save_cave(cave: &Cave, path: &Utf8Path) -> Result<(), KarstError> {
    let json = serde_json::to_string_pretty(cave)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a cave project file written by [`save_cave`].
pub fn load_cave(path: &Utf8Path) -> Result<Cave, KarstError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
