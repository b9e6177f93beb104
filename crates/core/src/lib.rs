pub mod config;
pub mod domain;
pub mod errors;

pub use domain::recording::{LookupResult, Recording, RecordingId, SearchResult};
pub use domain::stats::{CreatorClips, StatsResult, StatsSnapshot};
pub use errors::{ApiError, Argument, CommandError};
