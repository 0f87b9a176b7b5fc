// crates/core/src/session_id.rs
//! Session identifier generation.

use rand::Rng;

const SUFFIX_LEN: usize = 6;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a session id: `s-<unix millis>-<6 random alphanumerics>`.
///
/// Best-effort uniqueness. The millisecond timestamp plus 36^6 random
/// suffixes makes collisions vanishingly rare for a single site; the
/// journeys primary key catches the rest.
pub fn new_session_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("s-{millis}-{suffix}")
}
