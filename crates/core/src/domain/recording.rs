use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::wire::{count_entries, null_as_empty};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(pub String);

impl RecordingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One archived stream ("Vod") as returned by the archive API.
///
/// The timestamp keeps the offset it was sent with; rendering shows it in that
/// zone without conversion.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Recording {
    #[serde(rename = "uuid", default)]
    pub id: RecordingId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "date")]
    pub recorded_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(rename = "clips", default, deserialize_with = "count_entries")]
    pub clip_count: usize,
    #[serde(rename = "title_rank", default)]
    pub title_score: f64,
    #[serde(rename = "transcript_rank", default)]
    pub transcript_score: f64,
}

impl Recording {
    pub fn relevance(&self) -> f64 {
        self.title_score + self.transcript_score
    }
}

/// Ordered recordings from the search endpoint, in server order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub error: bool,
    #[serde(rename = "result", default, deserialize_with = "null_as_empty")]
    pub recordings: Vec<Recording>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}

/// Envelope of the single-recording endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LookupResult {
    #[serde(default)]
    pub error: bool,
    #[serde(rename = "result")]
    pub recording: Recording,
}
