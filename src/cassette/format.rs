//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every call made through the pipeline port, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable session name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Recorded calls.
    pub interactions: Vec<Interaction>,
}

/// One call and its outcome, stored as `{"Ok": ...}` or `{"Err": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the session.
    pub seq: u64,
    /// Port name (e.g., `"diffusion_pipeline"`).
    pub port: String,
    /// Port method (e.g., `"generate"`).
    pub method: String,
    /// Serialized arguments.
    pub input: serde_json::Value,
    /// Serialized result.
    pub output: serde_json::Value,
}
