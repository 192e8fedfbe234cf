//! Date and time utilities.

use std::{cmp::Ordering, fmt, marker::PhantomData, ops, str::FromStr, time::Duration};

use derive_more::{Debug, Display, Error};
use time::{format_description::well_known::Rfc3339, UtcOffset};

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Inner representation of the date and time.
    inner: time::OffsetDateTime,

    /// Type parameter describing the kind of date and time.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Creates a new [`DateTime`] representing the current date and time.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn now() -> Self {
        let inner = time::OffsetDateTime::now_utc();
        Self {
            _of: PhantomData,
            inner: inner
                .replace_microsecond(inner.microsecond())
                .expect("infallible"),
        }
    }

    /// Creates a new [`DateTime`] from the provided [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        use ParseError as E;

        time::OffsetDateTime::parse(input, &Rfc3339)
            .map_err(E::Parse)?
            .try_into()
            .map_err(E::ComponentRange)
    }

    /// Returns the [`DateTime`] as an [RFC 3339] string.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.inner.format(&Rfc3339).unwrap_or_else(|e| {
            panic!("cannot format `DateTime` as RFC 3339: {e}")
        })
    }

    /// Returns the calendar [`Date`] this [`DateTime`] falls on (UTC).
    #[must_use]
    pub fn date(&self) -> Date {
        Date(self.inner.date())
    }

    /// Coerces one kind of [`DateTime`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

/// Error of parsing [`DateTime`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ParseError {
    /// Failed to parse the string into an [`DateTime`].
    Parse(time::error::Parse),

    /// Parsed [`DateTime`] has an out of range component.
    ComponentRange(time::error::ComponentRange),
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> TryFrom<time::OffsetDateTime> for DateTimeOf<Of> {
    type Error = time::error::ComponentRange;

    fn try_from(dt: time::OffsetDateTime) -> Result<Self, Self::Error> {
        dt.to_offset(UtcOffset::UTC)
            .replace_microsecond(dt.microsecond())
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for time::OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.inner
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            inner: self.inner + rhs,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> ops::Sub for DateTimeOf<Of> {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        (self.inner - rhs.inner)
            .try_into()
            .expect("duration overflow")
    }
}

impl<Of: ?Sized> ops::Sub<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self {
            inner: self.inner - rhs,
            _of: PhantomData,
        }
    }
}

/// Calendar date without a time-of-day component.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] representing the current date (UTC).
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self)
    }

    /// Returns this [`Date`] shifted forward (or backward, when negative) by
    /// the provided number of days.
    ///
    /// [`None`] is returned on calendar overflow.
    #[must_use]
    pub fn plus_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(time::Duration::days(days)).map(Self)
    }

    /// Returns the first instant of this [`Date`] (midnight, UTC).
    #[must_use]
    pub fn start_of_day(self) -> DateTime {
        DateTimeOf {
            inner: self.0.with_time(time::Time::MIDNIGHT).assume_utc(),
            _of: PhantomData,
        }
    }

    /// Returns the last counted instant of this [`Date`] (23:59:59, UTC).
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn end_of_day(self) -> DateTime {
        let time = time::Time::from_hms(23, 59, 59).expect("infallible");
        DateTimeOf {
            inner: self.0.with_time(time).assume_utc(),
            _of: PhantomData,
        }
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day) =
            (self.0.year(), u8::from(self.0.month()), self.0.day());
        write!(f, "{year:04}-{month:02}-{day:02}")
    }
}

impl FromStr for Date {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let mut next =
            || parts.next().filter(|p| !p.is_empty()).ok_or("missing part");

        let year = next()?.parse().map_err(|_| "invalid year")?;
        let month = next()?.parse().map_err(|_| "invalid month")?;
        let day = next()?.parse().map_err(|_| "invalid day")?;

        Self::from_ymd(year, month, day).ok_or("invalid date")
    }
}

/// Closed calendar interval of [`Date`]s.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct DateRange {
    /// First [`Date`] of the interval.
    start: Date,

    /// Last [`Date`] of the interval, counted into it.
    end: Date,
}

impl DateRange {
    /// Creates a new [`DateRange`] if `start` doesn't come after `end`.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Returns the first [`Date`] of this interval.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last [`Date`] of this interval.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns the number of days in this interval, counting both ends.
    ///
    /// A single-day interval counts as 1 day.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end.0 - self.start.0).whole_days() + 1
    }

    /// Indicates whether this interval shares at least one day with the
    /// `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Indicates whether the provided [`Date`] falls into this interval.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Debug for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { start, end } = self;
        write!(f, "{start}..={end}")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Date, DateRange, DateTime};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    #[test]
    fn date_from_ymd() {
        assert_eq!(Date::from_ymd(2025, 1, 10).unwrap(), date("2025-01-10"));

        assert!(Date::from_ymd(2025, 2, 29).is_none());
        assert!(Date::from_ymd(2024, 2, 29).is_some());
        assert!(Date::from_ymd(2025, 13, 1).is_none());
        assert!(Date::from_ymd(2025, 0, 1).is_none());
    }

    #[test]
    fn date_from_str() {
        assert_eq!(
            Date::from_str("2025-01-10").unwrap(),
            Date::from_ymd(2025, 1, 10).unwrap(),
        );

        assert!(Date::from_str("2025-01").is_err());
        assert!(Date::from_str("2025-01-40").is_err());
        assert!(Date::from_str("not-a-date").is_err());
        assert!(Date::from_str("").is_err());
    }

    #[test]
    fn date_to_string() {
        assert_eq!(date("2025-01-10").to_string(), "2025-01-10");
        assert_eq!(date("2025-12-31").to_string(), "2025-12-31");
    }

    #[test]
    fn date_ordering_and_shifting() {
        assert!(date("2025-01-10") < date("2025-01-11"));
        assert_eq!(
            date("2025-01-31").plus_days(1).unwrap(),
            date("2025-02-01"),
        );
        assert_eq!(
            date("2025-01-01").plus_days(-1).unwrap(),
            date("2024-12-31"),
        );
    }

    #[test]
    fn date_day_bounds() {
        let day = date("2025-01-10");

        assert!(day.start_of_day() < day.end_of_day());
        assert_eq!(
            day.end_of_day() - day.start_of_day(),
            std::time::Duration::from_secs(24 * 60 * 60 - 1),
        );
        assert_eq!(day.start_of_day().date(), day);
        assert_eq!(day.end_of_day().date(), day);
    }

    #[test]
    fn datetime_rfc3339_roundtrip() {
        let dt = DateTime::from_rfc3339("2025-01-10T12:00:00Z").unwrap();

        assert_eq!(dt.to_rfc3339(), "2025-01-10T12:00:00Z");
        assert_eq!(dt.date(), date("2025-01-10"));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(DateRange::new(date("2025-01-12"), date("2025-01-10"))
            .is_none());
        assert!(DateRange::new(date("2025-01-10"), date("2025-01-10"))
            .is_some());
    }

    #[test]
    fn range_counts_days_inclusively() {
        assert_eq!(range("2025-01-10", "2025-01-10").days(), 1);
        assert_eq!(range("2025-01-10", "2025-01-12").days(), 3);
        assert_eq!(range("2025-01-30", "2025-02-02").days(), 4);
    }

    #[test]
    fn range_overlapping() {
        let it = range("2025-01-10", "2025-01-12");

        assert!(it.overlaps(&range("2025-01-12", "2025-01-15")));
        assert!(it.overlaps(&range("2025-01-08", "2025-01-10")));
        assert!(it.overlaps(&range("2025-01-11", "2025-01-11")));
        assert!(it.overlaps(&range("2025-01-01", "2025-02-01")));

        assert!(!it.overlaps(&range("2025-01-13", "2025-01-15")));
        assert!(!it.overlaps(&range("2025-01-08", "2025-01-09")));
    }

    #[test]
    fn range_containing() {
        let it = range("2025-01-10", "2025-01-12");

        assert!(it.contains(date("2025-01-10")));
        assert!(it.contains(date("2025-01-11")));
        assert!(it.contains(date("2025-01-12")));

        assert!(!it.contains(date("2025-01-09")));
        assert!(!it.contains(date("2025-01-13")));
    }
}
