use std::fmt;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * 60;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY * MILLIS_PER_SECOND;

/// Units a [`PackedTime`] can be truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
}

/// A time of day with millisecond precision packed into a single `u32`.
///
/// Layout, most significant byte first:
/// - byte 0: hour of day (0-23)
/// - byte 1: minute of hour (0-59)
/// - bytes 2-3: millisecond of minute as an **unsigned** 16-bit value
///   (0-59,999; the top of the range exceeds `i16`, so the field must never
///   be read through a signed type)
///
/// Field order is by significance, so the derived `Ord` on the packed bits is
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedTime(u32);

impl PackedTime {
    /// Sentinel for a missing value. Not a valid time (hour byte is 255).
    pub const MISSING: PackedTime = PackedTime(u32::MAX);

    pub const MIDNIGHT: PackedTime = PackedTime(0);
    pub const NOON: PackedTime = PackedTime(12 << 24);

    /// Packs hour/minute/second. Panics if any field is out of range.
    pub fn from_hms(hour: u8, minute: u8, second: u8) -> Self {
        Self::from_hms_milli(hour, minute, second, 0)
    }

    /// Packs hour/minute/second/millisecond. Panics if any field is out of
    /// range; an invalid time is a caller bug, not a recoverable state.
    pub fn from_hms_milli(hour: u8, minute: u8, second: u8, milli: u16) -> Self {
        assert!(hour < 24, "hour out of range: {hour}");
        assert!(minute < 60, "minute out of range: {minute}");
        assert!(second < 60, "second out of range: {second}");
        assert!(milli < 1000, "millisecond out of range: {milli}");
        let milli_of_minute = second as u32 * 1000 + milli as u32;
        PackedTime((hour as u32) << 24 | (minute as u32) << 16 | milli_of_minute)
    }

    pub fn from_bits(bits: u32) -> Self {
        PackedTime(bits)
    }

    pub fn to_bits(self) -> u32 {
        self.0
    }

    pub fn is_missing(self) -> bool {
        self == Self::MISSING
    }

    pub fn hour(self) -> u8 {
        assert!(!self.is_missing(), "field access on missing time");
        (self.0 >> 24) as u8
    }

    pub fn minute(self) -> u8 {
        assert!(!self.is_missing(), "field access on missing time");
        (self.0 >> 16) as u8
    }

    /// Millisecond of the current minute (0-59,999).
    pub fn millisecond_of_minute(self) -> u16 {
        assert!(!self.is_missing(), "field access on missing time");
        // Mask to 16 bits; the field is unsigned by design.
        (self.0 & 0xFFFF) as u16
    }

    pub fn second(self) -> u8 {
        (self.millisecond_of_minute() / 1000) as u8
    }

    /// Millisecond of the current second (0-999).
    pub fn millisecond(self) -> u16 {
        self.millisecond_of_minute() % 1000
    }

    pub fn nanosecond(self) -> u32 {
        (self.millisecond_of_minute() as u32 % 1000) * 1_000_000
    }

    pub fn minute_of_day(self) -> u32 {
        self.hour() as u32 * 60 + self.minute() as u32
    }

    pub fn second_of_day(self) -> u32 {
        self.hour() as u32 * 3600 + self.minute() as u32 * 60 + self.second() as u32
    }

    pub fn millisecond_of_day(self) -> u32 {
        self.minute_of_day() * 60_000 + self.millisecond_of_minute() as u32
    }

    /// Unpacks to (hour, minute, second, millisecond); `None` for the missing
    /// sentinel so no invalid calendar value can be observed.
    pub fn to_hms_milli(self) -> Option<(u8, u8, u8, u16)> {
        if self.is_missing() {
            return None;
        }
        Some((self.hour(), self.minute(), self.second(), self.millisecond()))
    }

    /// Adds `hours`, wrapping modulo 24h. A time of day has no date to carry
    /// into: 23:30 plus one hour is 00:30.
    pub fn plus_hours(self, hours: i64) -> Self {
        if self.is_missing() || hours == 0 {
            return self;
        }
        let hour = self.hour() as i64;
        let new_hour = (hours.rem_euclid(24) + hour).rem_euclid(24);
        Self::from_hms_milli(
            new_hour as u8,
            self.minute(),
            self.second(),
            self.millisecond(),
        )
    }

    pub fn plus_minutes(self, minutes: i64) -> Self {
        if self.is_missing() || minutes == 0 {
            return self;
        }
        let mofd = self.minute_of_day() as i64;
        let new_mofd = (minutes.rem_euclid(MINUTES_PER_DAY) + mofd).rem_euclid(MINUTES_PER_DAY);
        Self::from_hms_milli(
            (new_mofd / MINUTES_PER_HOUR) as u8,
            (new_mofd % MINUTES_PER_HOUR) as u8,
            self.second(),
            self.millisecond(),
        )
    }

    pub fn plus_seconds(self, seconds: i64) -> Self {
        if self.is_missing() || seconds == 0 {
            return self;
        }
        let sofd = self.second_of_day() as i64;
        let new_sofd = (seconds.rem_euclid(SECONDS_PER_DAY) + sofd).rem_euclid(SECONDS_PER_DAY);
        Self::from_hms_milli(
            (new_sofd / SECONDS_PER_HOUR) as u8,
            ((new_sofd / SECONDS_PER_MINUTE) % MINUTES_PER_HOUR) as u8,
            (new_sofd % SECONDS_PER_MINUTE) as u8,
            self.millisecond(),
        )
    }

    pub fn plus_millis(self, millis: i64) -> Self {
        if self.is_missing() || millis == 0 {
            return self;
        }
        let mofd = self.millisecond_of_day() as i64;
        let new_mofd = (millis.rem_euclid(MILLIS_PER_DAY) + mofd).rem_euclid(MILLIS_PER_DAY);
        Self::from_millisecond_of_day(new_mofd as u32)
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

    pub fn with_hour(self, hour: u8) -> Self {
        if self.is_missing() {
            return self;
        }
        Self::from_hms_milli(hour, self.minute(), self.second(), self.millisecond())
    }

    pub fn with_minute(self, minute: u8) -> Self {
        if self.is_missing() {
            return self;
        }
        Self::from_hms_milli(self.hour(), minute, self.second(), self.millisecond())
    }

    pub fn with_second(self, second: u8) -> Self {
        if self.is_missing() {
            return self;
        }
        Self::from_hms_milli(self.hour(), self.minute(), second, self.millisecond())
    }

    pub fn with_milli(self, milli: u16) -> Self {
        if self.is_missing() {
            return self;
        }
        Self::from_hms_milli(self.hour(), self.minute(), self.second(), milli)
    }

    /// Zeroes every field below `unit`. Truncation at or below milliseconds
    /// is a no-op.
    pub fn truncate_to(self, unit: TimeUnit) -> Self {
        if self.is_missing() {
            return self;
        }
        match unit {
            TimeUnit::Milliseconds => self,
            TimeUnit::Seconds => Self::from_hms_milli(self.hour(), self.minute(), self.second(), 0),
            TimeUnit::Minutes => Self::from_hms_milli(self.hour(), self.minute(), 0, 0),
            TimeUnit::Hours => Self::from_hms_milli(self.hour(), 0, 0, 0),
            TimeUnit::HalfDays => {
                Self::from_hms_milli(if self.hour() >= 12 { 12 } else { 0 }, 0, 0, 0)
            }
            TimeUnit::Days => Self::MIDNIGHT,
        }
    }

    fn from_millisecond_of_day(mofd: u32) -> Self {
        debug_assert!((mofd as i64) < MILLIS_PER_DAY);
        let hour = mofd / 3_600_000;
        let minute = (mofd / 60_000) % 60;
        let milli_of_minute = mofd % 60_000;
        PackedTime(hour << 24 | minute << 16 | milli_of_minute)
    }

    pub fn is_before(self, other: PackedTime) -> bool {
        self.0 < other.0
    }

    pub fn is_after(self, other: PackedTime) -> bool {
        self.0 > other.0
    }

    pub fn is_on_or_before(self, other: PackedTime) -> bool {
        self.0 <= other.0
    }

    pub fn is_on_or_after(self, other: PackedTime) -> bool {
        self.0 >= other.0
    }

    pub fn is_midnight(self) -> bool {
        self == Self::MIDNIGHT
    }

    pub fn is_noon(self) -> bool {
        self == Self::NOON
    }

    /// 12:00 noon is PM, midnight is AM.
    pub fn is_am(self) -> bool {
        self.0 < Self::NOON.0
    }

    pub fn is_pm(self) -> bool {
        self.0 >= Self::NOON.0
    }

    /// Signed seconds from `self` to `end` within the same day.
    pub fn seconds_until(self, end: PackedTime) -> i64 {
        end.second_of_day() as i64 - self.second_of_day() as i64
    }

    pub fn minutes_until(self, end: PackedTime) -> i64 {
        self.seconds_until(end) / 60
    }

    pub fn hours_until(self, end: PackedTime) -> i64 {
        self.seconds_until(end) / 3600
    }
}

impl fmt::Display for PackedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            self.hour(),
            self.minute(),
            self.second(),
            self.millisecond()
        )
    }
}
