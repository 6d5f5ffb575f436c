use crate::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default start time of position-indexed traces (2022-01-01T00:00:00Z).
pub const DEFAULT_START: Timestamp = 1_640_995_200;

/// Returns the current timestamp in seconds.
#[must_use]
pub fn timestamp() -> Timestamp {
    let start = SystemTime::now();

    start
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| Timestamp::try_from(d.as_secs()).unwrap_or(Timestamp::MAX))
}
