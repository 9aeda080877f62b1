use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::booking::BookingId;

const SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 9;

/// Mints `PREFIX-<unix millis>-<9 random base-36 chars>`.
pub fn mint_booking_id(prefix: &str, now: DateTime<Utc>) -> BookingId {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();

    BookingId::new(format!("{}-{}-{}", prefix, now.timestamp_millis(), suffix))
}
