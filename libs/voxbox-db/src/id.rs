//! Time-ordered identifiers.
//!
//! Layout (RFC 9562 version 7):
//!
//! | bits | content |
//! |------|---------|
//! | 48   | Unix time in milliseconds, big-endian |
//! | 4    | version `0b0111` |
//! | 12   | random |
//! | 2    | variant `0b10` |
//! | 62   | random |
//!
//! Ids created in later milliseconds always compare greater. Ordering inside
//! one millisecond is random.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

const TIMESTAMP_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Generate a new time-ordered id.
///
/// Uses the calling thread's random generator.
#[must_use]
pub fn new_id() -> Uuid {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    let mut random = [0u8; 10];
    rand::rng().fill(&mut random);
    from_parts(millis, random)
}

/// Extract the millisecond timestamp encoded in an id from [`new_id`].
#[must_use]
pub fn timestamp_millis(id: &Uuid) -> u64 {
    let bytes = id.as_bytes();
    let mut ts = [0u8; 8];
    ts[2..].copy_from_slice(&bytes[..6]);
    u64::from_be_bytes(ts)
}

fn from_parts(millis: u64, random: [u8; 10]) -> Uuid {
    let ts = (millis & TIMESTAMP_MASK).to_be_bytes();
    let mut bytes = [0u8; 16];
    bytes[..6].copy_from_slice(&ts[2..]);
    bytes[6..].copy_from_slice(&random);
    bytes[6] = 0x70 | (bytes[6] & 0x0F);
    bytes[8] = 0x80 | (bytes[8] & 0x3F);
    Uuid::from_bytes(bytes)
}
