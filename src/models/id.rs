use chrono::Utc;

const BASE36: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
const FRAGMENT_LEN: usize = 8;

/// Generates a record identifier: current epoch milliseconds joined to
/// a random base36 fragment. Unique enough for this traffic profile;
/// not a cryptographic guarantee.
///
/// IDs are always assigned here, in the action layer, never by a
/// storage backend.
pub fn generate() -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        random_string::generate(FRAGMENT_LEN, BASE36)
    )
}
