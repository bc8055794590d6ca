use std::fmt;

use super::date::PackedDate;
use super::datetime::PackedDateTime;
use super::time::PackedTime;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A UTC instant with millisecond precision packed into a single `u64`: the
/// day since 1970-01-01 in the high 32 bits and the millisecond of that day
/// in the low 32. Day outranks millisecond, so the derived `Ord` on the
/// packed bits is chronological order.
///
/// Instants before the epoch are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedInstant(u64);

impl PackedInstant {
    /// Sentinel for a missing value. Not a valid instant (the millisecond
    /// half exceeds a day).
    pub const MISSING: PackedInstant = PackedInstant(u64::MAX);

    pub const EPOCH: PackedInstant = PackedInstant(0);

    /// Packs milliseconds since 1970-01-01T00:00Z. Panics on pre-epoch
    /// values.
    pub fn from_epoch_milli(epoch_milli: i64) -> Self {
        assert!(epoch_milli >= 0, "instant before the epoch: {epoch_milli}");
        let day = (epoch_milli / MILLIS_PER_DAY) as u64;
        let mofd = (epoch_milli % MILLIS_PER_DAY) as u64;
        PackedInstant(day << 32 | mofd)
    }

    pub fn from_bits(bits: u64) -> Self {
        PackedInstant(bits)
    }

    pub fn to_bits(self) -> u64 {
        self.0
    }

    pub fn is_missing(self) -> bool {
        self == Self::MISSING
    }

    /// Days since 1970-01-01.
    pub fn epoch_day(self) -> u32 {
        assert!(!self.is_missing(), "field access on missing instant");
        (self.0 >> 32) as u32
    }

    /// Millisecond of the UTC day (0-86,399,999).
    pub fn millisecond_of_day(self) -> u32 {
        assert!(!self.is_missing(), "field access on missing instant");
        self.0 as u32
    }

    pub fn epoch_milli(self) -> i64 {
        self.epoch_day() as i64 * MILLIS_PER_DAY + self.millisecond_of_day() as i64
    }

    /// The same wall-clock fields as a [`PackedDateTime`] in UTC.
    pub fn to_datetime(self) -> PackedDateTime {
        if self.is_missing() {
            return PackedDateTime::MISSING;
        }
        let date = PackedDate::from_epoch_day(self.epoch_day() as i64);
        let time = PackedTime::MIDNIGHT.plus_millis(self.millisecond_of_day() as i64);
        PackedDateTime::new(date, time)
    }

    pub fn from_datetime(datetime: PackedDateTime) -> Self {
        if datetime.is_missing() {
            return Self::MISSING;
        }
        Self::from_epoch_milli(datetime.epoch_milli())
    }

    pub fn plus_millis(self, millis: i64) -> Self {
        if self.is_missing() || millis == 0 {
            return self;
        }
        Self::from_epoch_milli(self.epoch_milli() + millis)
    }

    pub fn plus_seconds(self, seconds: i64) -> Self {
        self.plus_millis(seconds * 1_000)
    }

    pub fn plus_minutes(self, minutes: i64) -> Self {
        self.plus_millis(minutes * 60_000)
    }

    pub fn plus_hours(self, hours: i64) -> Self {
        self.plus_millis(hours * 3_600_000)
    }

    pub fn plus_days(self, days: i64) -> Self {
        self.plus_millis(days * MILLIS_PER_DAY)
    }

    pub fn minus_millis(self, millis: i64) -> Self {
        self.plus_millis(-millis)
    }

    pub fn minus_seconds(self, seconds: i64) -> Self {
        self.plus_millis(-seconds * 1_000)
    }

    pub fn minus_days(self, days: i64) -> Self {
        self.plus_millis(-days * MILLIS_PER_DAY)
    }

    pub fn is_before(self, other: PackedInstant) -> bool {
        self.0 < other.0
    }

    pub fn is_after(self, other: PackedInstant) -> bool {
        self.0 > other.0
    }

    /// Signed whole milliseconds from `self` to `end`.
    pub fn millis_until(self, end: PackedInstant) -> i64 {
        end.epoch_milli() - self.epoch_milli()
    }

    pub fn seconds_until(self, end: PackedInstant) -> i64 {
        self.millis_until(end) / 1_000
    }
}

impl fmt::Display for PackedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(f, "{}Z", self.to_datetime())
    }
}
