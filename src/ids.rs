use chrono::{DateTime, Utc};
use uuid::Uuid;

/// `<prefix><unix millis>`, moved forward one millisecond at a time until
/// `taken` says the id is free.
pub fn millis_id(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let id = format!("{prefix}{millis}");
        if !taken(&id) {
            return id;
        }
        millis += 1;
    }
}

/// Nine lowercase alphanumerics.
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(9).collect()
}
