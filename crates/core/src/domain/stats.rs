use serde::{Deserialize, Serialize};

use super::wire::null_as_empty;

const BYTES_PER_TIB: f64 = (1u64 << 40) as f64;
const BYTES_PER_MIB: f64 = (1u64 << 20) as f64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorClips {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub clip_count: u64,
    #[serde(default, alias = "view_Count")]
    pub view_count: u64,
}

/// Aggregate archive counters from `/stats/long`.
///
/// `clips_per_creator` arrives ranked by the server; it is never re-sorted here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(rename = "count_vods_total", default)]
    pub recordings_total: u64,
    #[serde(rename = "count_clips_total", default)]
    pub clips_total: u64,
    #[serde(rename = "count_h_streamed", default)]
    pub hours_streamed: f64,
    #[serde(rename = "count_size_bytes", default)]
    pub size_bytes: u64,
    #[serde(rename = "count_transcript_words", default)]
    pub transcript_words: u64,
    #[serde(rename = "count_unique_words", default)]
    pub unique_words: u64,
    #[serde(rename = "count_avg_words", default)]
    pub average_words: u64,
    #[serde(rename = "database_size", default)]
    pub database_bytes: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clips_per_creator: Vec<CreatorClips>,
}

impl StatsSnapshot {
    pub fn size_tib(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_TIB
    }

    pub fn database_mib(&self) -> f64 {
        self.database_bytes as f64 / BYTES_PER_MIB
    }

    pub fn top_creators(&self, limit: usize) -> &[CreatorClips] {
        let end = self.clips_per_creator.len().min(limit);
        &self.clips_per_creator[..end]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StatsResult {
    #[serde(default)]
    pub error: bool,
    #[serde(rename = "result")]
    pub stats: StatsSnapshot,
}
