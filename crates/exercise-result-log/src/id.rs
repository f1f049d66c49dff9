//! Locally unique identifiers.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Length of the random part of generated identifiers.
pub const RANDOM_SUFFIX_LEN: usize = 9;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase alphanumeric string of [`RANDOM_SUFFIX_LEN`] characters.
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..RANDOM_SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// `{unix millis}-{random suffix}`, e.g. `1718000000000-k3j9x0a1b`.
pub fn new_record_id(at: DateTime<Utc>) -> String {
    format!("{}-{}", at.timestamp_millis(), random_suffix())
}
