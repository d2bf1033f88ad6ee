use chrono::prelude::*;

// Unix timestamp in milliseconds.
pub type Timestamp = i64;

pub fn now() -> Timestamp {
    Utc::now().timestamp_millis()
}
