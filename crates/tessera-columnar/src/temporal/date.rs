use std::fmt;

const DAYS_0000_TO_1970: i64 = 719_528;
const DAYS_PER_CYCLE: i64 = 146_097;

/// A calendar date packed into a single `u32`.
///
/// Layout, most significant byte first:
/// - bytes 0-1: year (0-9999)
/// - byte 2: month of year (1-12)
/// - byte 3: day of month (1-31)
///
/// Field order is by significance, so the derived `Ord` on the packed bits is
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedDate(u32);

impl PackedDate {
    /// Sentinel for a missing value. Not a valid date (month byte is 255).
    pub const MISSING: PackedDate = PackedDate(u32::MAX);

    /// Packs year/month/day. Panics if the fields do not name a real
    /// calendar date.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        assert!(year <= 9999, "year out of range: {year}");
        assert!((1..=12).contains(&month), "month out of range: {month}");
        let last = days_in_month(year, month);
        assert!(
            (1..=last).contains(&day),
            "day out of range for {year}-{month:02}: {day}"
        );
        PackedDate((year as u32) << 16 | (month as u32) << 8 | day as u32)
    }

    pub fn from_bits(bits: u32) -> Self {
        PackedDate(bits)
    }

    pub fn to_bits(self) -> u32 {
        self.0
    }

    pub fn is_missing(self) -> bool {
        self == Self::MISSING
    }

    pub fn year(self) -> u16 {
        assert!(!self.is_missing(), "field access on missing date");
        (self.0 >> 16) as u16
    }

    pub fn month(self) -> u8 {
        assert!(!self.is_missing(), "field access on missing date");
        (self.0 >> 8) as u8
    }

    pub fn day(self) -> u8 {
        assert!(!self.is_missing(), "field access on missing date");
        self.0 as u8
    }

    /// Unpacks to (year, month, day); `None` for the missing sentinel.
    pub fn to_ymd(self) -> Option<(u16, u8, u8)> {
        if self.is_missing() {
            return None;
        }
        Some((self.year(), self.month(), self.day()))
    }

    pub fn is_leap_year(self) -> bool {
        is_leap(self.year())
    }

    /// Quarter of the year, 1-4.
    pub fn quarter(self) -> u8 {
        (self.month() - 1) / 3 + 1
    }

    /// Day of the week, ISO numbering: Monday = 1 .. Sunday = 7.
    pub fn day_of_week(self) -> u8 {
        // 1970-01-01 was a Thursday.
        ((self.epoch_day() + 3).rem_euclid(7) + 1) as u8
    }

    pub fn day_of_year(self) -> u16 {
        let cumulative: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
        let mut doy = cumulative[self.month() as usize - 1] + self.day() as u16;
        if self.month() > 2 && self.is_leap_year() {
            doy += 1;
        }
        doy
    }

    /// Days since 1970-01-01, negative before the epoch.
    pub fn epoch_day(self) -> i64 {
        let y = self.year() as i64;
        let m = self.month() as i64;
        let mut total = 365 * y;
        total += (y + 3) / 4 - (y + 99) / 100 + (y + 399) / 400;
        total += (367 * m - 362) / 12;
        total += self.day() as i64 - 1;
        if m > 2 {
            total -= 1;
            if !is_leap(self.year()) {
                total -= 1;
            }
        }
        total - DAYS_0000_TO_1970
    }

    /// Inverse of [`epoch_day`](Self::epoch_day). Panics if the resulting
    /// year falls outside 0-9999.
    pub fn from_epoch_day(epoch_day: i64) -> Self {
        let mut zero_day = epoch_day + DAYS_0000_TO_1970;
        // Shift to a cycle starting March 1 so the leap day lands last.
        zero_day -= 60;
        let mut adjust = 0i64;
        if zero_day < 0 {
            let cycles = (zero_day + 1) / DAYS_PER_CYCLE - 1;
            adjust = cycles * 400;
            zero_day += -cycles * DAYS_PER_CYCLE;
        }
        let mut year_est = (400 * zero_day + 591) / DAYS_PER_CYCLE;
        let mut doy_est = zero_day - (365 * year_est + year_est / 4 - year_est / 100 + year_est / 400);
        if doy_est < 0 {
            year_est -= 1;
            doy_est = zero_day - (365 * year_est + year_est / 4 - year_est / 100 + year_est / 400);
        }
        year_est += adjust;
        let march_doy = doy_est;
        let march_month = (march_doy * 5 + 2) / 153;
        let month = ((march_month + 2) % 12) + 1;
        let day = march_doy - (march_month * 306 + 5) / 10 + 1;
        let year = year_est + march_month / 10;
        assert!((0..=9999).contains(&year), "epoch day out of range: {epoch_day}");
        Self::from_ymd(year as u16, month as u8, day as u8)
    }

    pub fn plus_days(self, days: i64) -> Self {
        if self.is_missing() || days == 0 {
            return self;
        }
        Self::from_epoch_day(self.epoch_day() + days)
    }

    pub fn minus_days(self, days: i64) -> Self {
        self.plus_days(-days)
    }

    pub fn plus_weeks(self, weeks: i64) -> Self {
        self.plus_days(weeks * 7)
    }

    pub fn minus_weeks(self, weeks: i64) -> Self {
        self.plus_days(-weeks * 7)
    }

    /// Adds `months`, clamping the day to the last day of the target month
    /// (January 31 plus one month is February 28 or 29).
    pub fn plus_months(self, months: i64) -> Self {
        if self.is_missing() || months == 0 {
            return self;
        }
        let linear = self.year() as i64 * 12 + self.month() as i64 - 1 + months;
        let year = linear.div_euclid(12);
        let month = linear.rem_euclid(12) as u8 + 1;
        assert!((0..=9999).contains(&year), "year out of range after shift");
        let day = self.day().min(days_in_month(year as u16, month));
        Self::from_ymd(year as u16, month, day)
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

    pub fn with_year(self, year: u16) -> Self {
        if self.is_missing() {
            return self;
        }
        let day = self.day().min(days_in_month(year, self.month()));
        Self::from_ymd(year, self.month(), day)
    }

    pub fn with_month(self, month: u8) -> Self {
        if self.is_missing() {
            return self;
        }
        let day = self.day().min(days_in_month(self.year(), month));
        Self::from_ymd(self.year(), month, day)
    }

    pub fn with_day(self, day: u8) -> Self {
        if self.is_missing() {
            return self;
        }
        Self::from_ymd(self.year(), self.month(), day)
    }

    pub fn is_before(self, other: PackedDate) -> bool {
        self.0 < other.0
    }

    pub fn is_after(self, other: PackedDate) -> bool {
        self.0 > other.0
    }

    pub fn is_on_or_before(self, other: PackedDate) -> bool {
        self.0 <= other.0
    }

    pub fn is_on_or_after(self, other: PackedDate) -> bool {
        self.0 >= other.0
    }

    pub fn length_of_month(self) -> u8 {
        days_in_month(self.year(), self.month())
    }

    pub fn length_of_year(self) -> u16 {
        if self.is_leap_year() {
            366
        } else {
            365
        }
    }

    /// Signed whole days from `self` to `end`.
    pub fn days_until(self, end: PackedDate) -> i64 {
        end.epoch_day() - self.epoch_day()
    }

    pub fn weeks_until(self, end: PackedDate) -> i64 {
        self.days_until(end) / 7
    }

    /// Signed whole months from `self` to `end`, counting a month only once
    /// the day of month is reached.
    pub fn months_until(self, end: PackedDate) -> i64 {
        let packed_months = |d: PackedDate| d.year() as i64 * 12 + d.month() as i64 - 1;
        let mut months = packed_months(end) - packed_months(self);
        if months > 0 && end.day() < self.day() {
            months -= 1;
        } else if months < 0 && end.day() > self.day() {
            months += 1;
        }
        months
    }

    pub fn years_until(self, end: PackedDate) -> i64 {
        self.months_until(end) / 12
    }
}

pub(crate) fn is_leap(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap(year) {
                29
            } else {
                28
            }
        }
        _ => panic!("month out of range: {month}"),
    }
}

impl fmt::Display for PackedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            return Ok(());
        }
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}
