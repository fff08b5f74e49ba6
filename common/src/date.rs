//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::BorrowedFormatItem, macros::format_description};

/// `YYYY-MM-DD` format of a [`Date`].
const FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time-of-day component.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Returns the current UTC [`Date`].
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components do not form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the [`Date`] following this one.
    ///
    /// [`None`] is returned on overflow of the supported calendar range.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Returns the [`Date`] preceding this one.
    ///
    /// [`None`] is returned on underflow of the supported calendar range.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.0.previous_day().map(Self)
    }

    /// Returns the number of days from this [`Date`] until the `other` one.
    ///
    /// Negative if the `other` [`Date`] is earlier.
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, FORMAT).map(Self).map_err(ParseError)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Error of parsing a [`Date`] from a `YYYY-MM-DD` string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

/// Half-open range of nights `[check_in, check_out)`.
///
/// The night of `check_out` itself is not included.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Stay {
    /// First night of this [`Stay`].
    check_in: Date,

    /// [`Date`] of departure, exclusive.
    check_out: Date,
}

impl Stay {
    /// Creates a new [`Stay`] if `check_out` is strictly later than
    /// `check_in`.
    #[must_use]
    pub fn new(check_in: Date, check_out: Date) -> Option<Self> {
        (check_out > check_in).then_some(Self {
            check_in,
            check_out,
        })
    }

    /// Creates a new [`Stay`] of the single night of the provided `day`.
    ///
    /// [`None`] is returned on overflow of the supported calendar range.
    #[must_use]
    pub fn night(day: Date) -> Option<Self> {
        Self::new(day, day.next()?)
    }

    /// Creates a new [`Stay`] of every night of the calendar month the
    /// provided `day` belongs to.
    ///
    /// [`None`] is returned on overflow of the supported calendar range.
    #[must_use]
    pub fn month_of(day: Date) -> Option<Self> {
        let (year, month) = (day.0.year(), day.0.month());
        let first = time::Date::from_calendar_date(year, month, 1).ok()?;
        let next_year = if month == time::Month::December {
            year.checked_add(1)?
        } else {
            year
        };
        let next = time::Date::from_calendar_date(next_year, month.next(), 1)
            .ok()?;
        Self::new(Date(first), Date(next))
    }

    /// Returns the first night of this [`Stay`].
    #[must_use]
    pub fn check_in(&self) -> Date {
        self.check_in
    }

    /// Returns the departure [`Date`] of this [`Stay`].
    #[must_use]
    pub fn check_out(&self) -> Date {
        self.check_out
    }

    /// Returns the last night of this [`Stay`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn last_night(&self) -> Date {
        self.check_out
            .previous()
            .expect("`check_out` is later than `check_in`")
    }

    /// Returns the number of nights in this [`Stay`].
    #[must_use]
    pub fn num_nights(&self) -> u32 {
        u32::try_from(self.check_in.days_until(self.check_out))
            .unwrap_or(u32::MAX)
    }

    /// Returns an iterator over every night of this [`Stay`].
    pub fn nights(&self) -> impl Iterator<Item = Date> {
        let end = self.check_out;
        std::iter::successors(Some(self.check_in), move |d| {
            d.next().filter(|n| *n < end)
        })
    }

    /// Indicates whether the provided night belongs to this [`Stay`].
    #[must_use]
    pub fn contains(&self, night: Date) -> bool {
        self.check_in <= night && night < self.check_out
    }

    /// Indicates whether this [`Stay`] shares at least one night with the
    /// `other` one.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl fmt::Display for Stay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = String::deserialize(d)?;
            Self::from_str(&s).map_err(D::Error::custom)
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Date, Stay};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    #[test]
    fn parses_and_formats_iso_dates() {
        assert_eq!(date("2025-01-18"), Date::from_calendar(2025, 1, 18).unwrap());
        assert_eq!(date("2025-01-08").to_string(), "2025-01-08");

        assert!(Date::from_str("2025-1-8").is_err());
        assert!(Date::from_str("2025-02-30").is_err());
        assert!(Date::from_str("18.01.2025").is_err());
    }

    #[test]
    fn stay_requires_later_check_out() {
        assert!(Stay::new(date("2025-01-20"), date("2025-01-18")).is_none());
        assert!(Stay::new(date("2025-01-20"), date("2025-01-20")).is_none());
        assert!(Stay::new(date("2025-01-18"), date("2025-01-20")).is_some());
    }

    #[test]
    fn stay_excludes_check_out_night() {
        let stay = Stay::new(date("2025-01-30"), date("2025-02-02")).unwrap();

        assert_eq!(stay.num_nights(), 3);
        assert_eq!(
            stay.nights().collect::<Vec<_>>(),
            vec![date("2025-01-30"), date("2025-01-31"), date("2025-02-01")],
        );
        assert_eq!(stay.last_night(), date("2025-02-01"));
        assert!(stay.contains(date("2025-02-01")));
        assert!(!stay.contains(date("2025-02-02")));
    }

    #[test]
    fn covers_single_nights_and_months() {
        let night = Stay::night(date("2025-02-28")).unwrap();
        assert_eq!(night.num_nights(), 1);
        assert_eq!(night.check_out(), date("2025-03-01"));

        let feb = Stay::month_of(date("2024-02-17")).unwrap();
        assert_eq!(feb.check_in(), date("2024-02-01"));
        assert_eq!(feb.num_nights(), 29);

        let dec = Stay::month_of(date("2025-12-31")).unwrap();
        assert_eq!(dec.check_in(), date("2025-12-01"));
        assert_eq!(dec.check_out(), date("2026-01-01"));
    }

    #[test]
    fn back_to_back_stays_do_not_overlap() {
        let first = Stay::new(date("2025-03-01"), date("2025-03-03")).unwrap();
        let second = Stay::new(date("2025-03-03"), date("2025-03-05")).unwrap();
        let third = Stay::new(date("2025-03-02"), date("2025-03-04")).unwrap();

        assert!(!first.overlaps(&second));
        assert!(first.overlaps(&third));
        assert!(third.overlaps(&second));
    }
}
