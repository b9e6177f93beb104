//! Decoders for the archive API's loose JSON shapes.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Length of a list that may be `null`. Only the number of clips is ever shown.
pub(crate) fn count_entries<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<IgnoredAny>>::deserialize(deserializer)?;
    Ok(entries.map_or(0, |entries| entries.len()))
}

/// A list that may be `null`, decoded as empty.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
