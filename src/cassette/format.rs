//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every port interaction in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording was made.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made at, or "unknown".
    pub commit: String,
    /// The recorded interactions, in sequence order.
    pub interactions: Vec<Interaction>,
}

/// One recorded port call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position within the recording.
    pub seq: u64,
    /// Port name (e.g., `"image_blender"`).
    pub port: String,
    /// Method name (e.g., `"blend"`).
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized call output using the `{"Ok": ...}` / `{"Err": ...}`
    /// convention.
    pub output: serde_json::Value,
}
