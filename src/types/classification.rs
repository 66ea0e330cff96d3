//! Classification result type

use serde::{Deserialize, Serialize};

/// Intent reported when the model response cannot be interpreted.
pub const FALLBACK_INTENT: &str = "fallback";

/// Rationale reported alongside [`FALLBACK_INTENT`].
pub const FALLBACK_RATIONALE: &str = "<parse failed>";

/// Outcome of one classification call.
///
/// `confidence` is whatever the model reported, cast to `f64`; it is not
/// clamped to `[0, 1]`. `raw` holds the re-serialized parsed object on
/// success and the unmodified model text on fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: String,
    pub confidence: f64,
    pub rationale: String,
    pub raw: String,
}

impl Classification {
    /// The fixed fallback result, keeping `raw` for diagnosis.
    pub fn fallback(raw: impl Into<String>) -> Self {
        Self {
            intent: FALLBACK_INTENT.to_string(),
            confidence: 0.0,
            rationale: FALLBACK_RATIONALE.to_string(),
            raw: raw.into(),
        }
    }

    /// Whether this is the parse-failure fallback.
    ///
    /// A model that legitimately answers `"fallback"` with a rationale of
    /// its own is not counted.
    pub fn is_fallback(&self) -> bool {
        self.intent == FALLBACK_INTENT && self.rationale == FALLBACK_RATIONALE
    }
}
