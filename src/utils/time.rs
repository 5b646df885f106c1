// src/utils/time.rs

use chrono::{SecondsFormat, Utc};

/// RFC3339 timestamp for `created_at`/`updated_at` columns.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
