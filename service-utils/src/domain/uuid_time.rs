//! Timestamp recovery from version-1 UUIDs.
//!
//! A v1 UUID stores a 60-bit count of 100-nanosecond ticks since the UUID
//! epoch (1582-10-15) split across three fields:
//!
//! ```text
//! time_low - time_mid - version|time_high - clock_seq - node
//! ```
//!
//! Callers are expected to validate UUID shape upstream. Malformed input never
//! fails here; it produces a meaningless number instead.

use chrono::{DateTime, Utc};

/// Ticks between the UUID epoch and the Unix epoch.
pub const UUID_EPOCH_OFFSET_TICKS: u64 = 122_192_928_000_000_000;

const TICKS_PER_MILLI: u64 = 10_000;

/// Reassemble the 60-bit timestamp of a v1 UUID.
///
/// Returns `0` when the reassembled digits are not valid hexadecimal.
///
/// # Examples
/// ```
/// use service_utils::domain::get_time_int_from_uuid;
///
/// let ticks = get_time_int_from_uuid("c232ab00-9414-11ec-b3c8-9f6bdeced846");
/// assert_eq!(ticks, 0x1ec_9414_c232_ab00);
/// ```
pub fn get_time_int_from_uuid(uuid: &str) -> u64 {
    let mut groups = uuid.split('-');
    let time_low = groups.next().unwrap_or_default();
    let time_mid = groups.next().unwrap_or_default();
    let time_high = groups.next().unwrap_or_default();

    // Drop the version nibble, the leading digit of the third group.
    let mut hex: String = time_high.chars().skip(1).collect();
    hex.push_str(time_mid);
    hex.push_str(time_low);

    u64::from_str_radix(&hex, 16).unwrap_or_default()
}

/// Convert the embedded v1 timestamp into a UTC date.
///
/// Sub-millisecond precision is dropped. Returns `None` when the timestamp
/// does not map onto a representable date.
pub fn get_date_from_uuid(uuid: &str) -> Option<DateTime<Utc>> {
    let ticks = i128::from(get_time_int_from_uuid(uuid));
    let unix_ticks = ticks - i128::from(UUID_EPOCH_OFFSET_TICKS);
    let millis = i64::try_from(unix_ticks / i128::from(TICKS_PER_MILLI)).ok()?;
    DateTime::from_timestamp_millis(millis)
}
