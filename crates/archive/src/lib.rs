//! HTTP access to the stream archive API.
//!
//! Three read-only endpoints are used:
//! - `GET /vods/?limit=<n>[&q=<query>]` - search, or the most recent recordings
//! - `GET /vods/<uuid>` - a single recording
//! - `GET /stats/long` - aggregate archive statistics
//!
//! Every call is a single attempt; callers get a typed [`ApiError`] on failure.

pub mod client;

pub use archivbot_core::ApiError;
pub use client::{ArchiveApi, ArchiveClient, MOST_RECENT_LIMIT, SEARCH_LIMIT};
