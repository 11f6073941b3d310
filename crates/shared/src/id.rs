use time::OffsetDateTime;
use ulid::Ulid;

/// Mint a row id. Every identifier in the system is a 26-char ULID string
/// established once at creation; external ids are never re-interpreted at
/// call sites.
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Current wall clock as a unix timestamp, the storage format for all row
/// timestamps.
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
