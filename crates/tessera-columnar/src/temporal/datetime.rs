use std::fmt;

use super::date::PackedDate;
use super::time::{PackedTime, TimeUnit};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A calendar date-time packed into a single `u64`: the [`PackedDate`] bits
/// in the high 32 and the [`PackedTime`] bits in the low 32. Date outranks
/// time, so the derived `Ord` on the packed bits is chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedDateTime(u64);

impl PackedDateTime {
    /// Sentinel for a missing value. Both halves are the missing sentinels
    /// of their component types.
    pub const MISSING: PackedDateTime = PackedDateTime(u64::MAX);

    pub fn new(date: PackedDate, time: PackedTime) -> Self {
        assert!(!date.is_missing() && !time.is_missing(), "component is missing");
        PackedDateTime((date.to_bits() as u64) << 32 | time.to_bits() as u64)
    }

    pub fn from_ymd_hms(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self::new(
            PackedDate::from_ymd(year, month, day),
            PackedTime::from_hms(hour, minute, second),
        )
    }

    pub fn from_bits(bits: u64) -> Self {
        PackedDateTime(bits)
    }

    pub fn to_bits(self) -> u64 {
        self.0
    }

    pub fn is_missing(self) -> bool {
        self == Self::MISSING
    }

    pub fn date(self) -> PackedDate {
        assert!(!self.is_missing(), "field access on missing date-time");
        PackedDate::from_bits((self.0 >> 32) as u32)
    }

    pub fn time(self) -> PackedTime {
        assert!(!self.is_missing(), "field access on missing date-time");
        PackedTime::from_bits(self.0 as u32)
    }

    pub fn year(self) -> u16 {
        self.date().year()
    }

    pub fn month(self) -> u8 {
        self.date().month()
    }

    pub fn day(self) -> u8 {
        self.date().day()
    }

    pub fn hour(self) -> u8 {
        self.time().hour()
    }

    pub fn minute(self) -> u8 {
        self.time().minute()
    }

    pub fn second(self) -> u8 {
        self.time().second()
    }

    pub fn millisecond(self) -> u16 {
        self.time().millisecond()
    }

    /// Milliseconds since 1970-01-01T00:00, treating the value as UTC.
    pub fn epoch_milli(self) -> i64 {
        self.date().epoch_day() * MILLIS_PER_DAY + self.time().millisecond_of_day() as i64
    }

    pub fn from_epoch_milli(epoch_milli: i64) -> Self {
        let day = epoch_milli.div_euclid(MILLIS_PER_DAY);
        let mofd = epoch_milli.rem_euclid(MILLIS_PER_DAY);
        let time = PackedTime::MIDNIGHT.plus_millis(mofd);
        Self::new(PackedDate::from_epoch_day(day), time)
    }

    pub fn plus_days(self, days: i64) -> Self {
        if self.is_missing() || days == 0 {
            return self;
        }
        Self::new(self.date().plus_days(days), self.time())
    }

    pub fn minus_days(self, days: i64) -> Self {
        self.plus_days(-days)
    }

    pub fn plus_months(self, months: i64) -> Self {
        if self.is_missing() || months == 0 {
            return self;
        }
        Self::new(self.date().plus_months(months), self.time())
    }

    pub fn minus_months(self, months: i64) -> Self {
        self.plus_months(-months)
    }

    pub fn plus_years(self, years: i64) -> Self {
        self.plus_months(years * 12)
    }

    pub fn minus_years(self, years: i64) -> Self {
        self.plus_months(-years * 12)
    }

    /// Adds `hours`, carrying into the date. Unlike [`PackedTime`], a
    /// date-time has a date to overflow into.
    pub fn plus_hours(self, hours: i64) -> Self {
        self.plus_millis(hours * 3_600_000)
    }

    pub fn plus_minutes(self, minutes: i64) -> Self {
        self.plus_millis(minutes * 60_000)
    }

    pub fn plus_seconds(self, seconds: i64) -> Self {
        self.plus_millis(seconds * 1_000)
    }

    pub fn plus_millis(self, millis: i64) -> Self {
        if self.is_missing() || millis == 0 {
            return self;
        }
        Self::from_epoch_milli(self.epoch_milli() + millis)
    }

    pub fn minus_hours(self, hours: i64) -> Self {
        self.plus_hours(-hours)
    }

    pub fn minus_minutes(self, minutes: i64) -> Self {
        self.plus_minutes(-minutes)
    }

    pub fn minus_seconds(self, seconds: i64) -> Self {
        self.plus_seconds(-seconds)
    }

    pub fn minus_millis(self, millis: i64) -> Self {
        self.plus_millis(-millis)
    }

    pub fn truncate_to(self, unit: TimeUnit) -> Self {
        if self.is_missing() {
            return self;
        }
        Self::new(self.date(), self.time().truncate_to(unit))
    }

    pub fn is_before(self, other: PackedDateTime) -> bool {
        self.0 < other.0
    }

    pub fn is_after(self, other: PackedDateTime) -> bool {
        self.0 > other.0
    }

    pub fn is_on_or_before(self, other: PackedDateTime) -> bool {
        self.0 <= other.0
    }

    pub fn is_on_or_after(self, other: PackedDateTime) -> bool {
        self.0 >= other.0
    }

    /// Signed whole milliseconds from `self` to `end`.
    pub fn millis_until(self, end: PackedDateTime) -> i64 {
        end.epoch_milli() - self.epoch_milli()
    }

    pub fn seconds_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / 1_000
    }

    pub fn minutes_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / 60_000
    }

    pub fn hours_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / 3_600_000
    }

    pub fn days_until(self, end: PackedDateTime) -> i64 {
        self.millis_until(end) / MILLIS_PER_DAY
    }
}

impl fmt::Display for PackedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(f, "{}T{}", self.date(), self.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: u16, mo: u8, d: u8, h: u8, mi: u8, s: u8, ms: u16) -> PackedDateTime {
        PackedDateTime::new(
            PackedDate::from_ymd(y, mo, d),
            PackedTime::from_hms_milli(h, mi, s, ms),
        )
    }

    #[test]
    fn halves_round_trip() {
        let v = dt(2021, 7, 4, 13, 45, 12, 345);
        assert_eq!(v.date(), PackedDate::from_ymd(2021, 7, 4));
        assert_eq!(v.time(), PackedTime::from_hms_milli(13, 45, 12, 345));
        assert_eq!(v.to_string(), "2021-07-04T13:45:12.345");
        assert_eq!(PackedDateTime::from_bits(v.to_bits()), v);
    }

    #[test]
    fn packed_order_is_chronological() {
        let a = dt(2020, 12, 31, 23, 59, 59, 999);
        let b = dt(2021, 1, 1, 0, 0, 0, 0);
        assert!(a.is_before(b));
        assert!(b.is_after(a));
        assert!(a < b);
        // Date outranks time even when the earlier date has a later time.
        assert!(dt(2020, 1, 1, 23, 0, 0, 0) < dt(2020, 1, 2, 1, 0, 0, 0));
    }

    #[test]
    fn time_arithmetic_carries_into_date() {
        let v = dt(2021, 12, 31, 23, 0, 0, 0);
        assert_eq!(v.plus_minutes(90), dt(2022, 1, 1, 0, 30, 0, 0));
        assert_eq!(v.plus_hours(2), dt(2022, 1, 1, 1, 0, 0, 0));
        assert_eq!(
            dt(2021, 1, 1, 0, 0, 0, 0).minus_millis(1),
            dt(2020, 12, 31, 23, 59, 59, 999)
        );
    }

    #[test]
    fn epoch_milli_round_trips() {
        assert_eq!(dt(1970, 1, 1, 0, 0, 0, 0).epoch_milli(), 0);
        assert_eq!(dt(1970, 1, 2, 0, 0, 0, 1).epoch_milli(), 86_400_001);
        assert_eq!(dt(1969, 12, 31, 23, 59, 59, 999).epoch_milli(), -1);
        for millis in [-1i64, 0, 1, 86_400_001, 1_625_405_112_345] {
            assert_eq!(PackedDateTime::from_epoch_milli(millis).epoch_milli(), millis);
        }
    }

    #[test]
    fn truncation_leaves_date_alone() {
        let v = dt(2021, 7, 4, 13, 45, 12, 345);
        assert_eq!(v.truncate_to(TimeUnit::Hours), dt(2021, 7, 4, 13, 0, 0, 0));
        assert_eq!(v.truncate_to(TimeUnit::Days), dt(2021, 7, 4, 0, 0, 0, 0));
    }

    #[test]
    fn missing_sentinel_is_inert() {
        let missing = PackedDateTime::MISSING;
        assert!(missing.is_missing());
        assert_eq!(missing.plus_hours(5), PackedDateTime::MISSING);
        assert_eq!(missing.truncate_to(TimeUnit::Days), PackedDateTime::MISSING);
        assert_eq!(missing.to_string(), "");
    }

    #[test]
    fn until_helpers() {
        let a = dt(2021, 1, 1, 0, 0, 0, 0);
        let b = dt(2021, 1, 2, 12, 0, 0, 0);
        assert_eq!(a.hours_until(b), 36);
        assert_eq!(a.days_until(b), 1);
        assert_eq!(b.hours_until(a), -36);
    }
}
