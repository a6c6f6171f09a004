use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Compact counter text: 999, 1.2k, 34.5k, 1.2M.
pub fn format_count(count: u64) -> String {
    const UNITS: [(u64, &str); 2] = [(1_000_000, "M"), (1_000, "k")];

    for (scale, suffix) in UNITS {
        if count >= scale {
            let value = count as f64 / scale as f64;
            return if value >= 100.0 {
                format!("{value:.0}{suffix}")
            } else {
                format!("{value:.1}{suffix}")
            };
        }
    }
    count.to_string()
}

/// Date part of an ISO-8601 timestamp; other input comes back unchanged.
pub fn short_date(timestamp: &str) -> &str {
    timestamp
        .split_once('T')
        .map(|(date, _)| date)
        .unwrap_or(timestamp)
}

pub fn stable_seed(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}
