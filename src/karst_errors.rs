use thiserror::Error;

/// Crate-wide error type.
///
/// The variants split along the taxonomy used by the reconstruction engine:
/// programming-invariant violations (duplicate station placement, malformed
/// color ramps) abort the running operation, while bad survey data never
/// surfaces here — it is recorded on the survey as diagnostic sets instead.
#[derive(Error, Debug)]
pub enum KarstError {
    #[error("station '{station}' is already placed (while placing shot '{from}' -> '{to}')")]
    StationAlreadyPlaced {
        station: String,
        from: String,
        to: String,
    },

    #[error("survey name already used in this cave: {0}")]
    DuplicateSurveyName(String),

    #[error("survey index out of range: {0}")]
    SurveyIndexOutOfRange(usize),

    #[error("a color ramp needs at least two stops, got {0}")]
    TooFewGradientStops(usize),

    #[error("gradient stop threshold is NaN")]
    NanGradientThreshold(#[from] ordered_float::FloatIsNan),

    #[error("invalid color literal: {0}")]
    InvalidColorLiteral(String),

    #[error("invalid UTM zone: {0} (expected 1..=60)")]
    InvalidUtmZone(u8),

    #[error("declination service response not understood: {0}")]
    DeclinationUnavailable(String),

    #[error("unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON (de)serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP ureq error: {0}")]
    UreqHttpError(#[from] ureq::Error),
}
