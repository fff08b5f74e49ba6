//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::{Display, Error};
use rust_decimal::{Decimal, RoundingStrategy};

/// Share of a whole, within `0..=100`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`], unless the provided `val` is out of the
    /// `0..=100` range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Returns the number of percents.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns what remains of the `amount` after deducting this [`Percent`]
    /// of it, rounded to the nearest whole unit (halves away from zero).
    ///
    /// Never negative. [`None`] is returned on overflow.
    #[must_use]
    pub fn deduct_from(self, amount: Decimal) -> Option<Decimal> {
        let rest = amount
            .checked_mul(Decimal::ONE_HUNDRED - self.0)?
            .checked_div(Decimal::ONE_HUNDRED)?;
        Some(
            rest.round_dp_with_strategy(
                0,
                RoundingStrategy::MidpointAwayFromZero,
            )
            .max(Decimal::ZERO),
        )
    }
}

/// Error of parsing a [`Percent`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("not a number within `0..=100`")]
pub struct ParseError;

impl FromStr for Percent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_end_matches('%')
            .parse()
            .ok()
            .and_then(Self::new)
            .ok_or(ParseError)
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Percent;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_within_range_only() {
        for ok in ["0", "12.5", "100", "15%"] {
            assert!(Percent::from_str(ok).is_ok(), "{ok}");
        }
        for err in ["-1", "100.01", "ten", ""] {
            assert!(Percent::from_str(err).is_err(), "{err}");
        }
    }

    #[test]
    fn deducts_with_half_away_rounding() {
        let ten = Percent::from_str("10").unwrap();
        assert_eq!(
            ten.deduct_from(decimal("1000000")),
            Some(decimal("900000")),
        );

        let third = Percent::from_str("33").unwrap();
        assert_eq!(third.deduct_from(decimal("150")), Some(decimal("101")));

        let half = Percent::from_str("50").unwrap();
        assert_eq!(half.deduct_from(decimal("3")), Some(decimal("2")));

        let all = Percent::from_str("100").unwrap();
        assert_eq!(all.deduct_from(decimal("500000")), Some(decimal("0")));
    }

    #[test]
    fn overflow_is_reported() {
        let ten = Percent::from_str("10").unwrap();

        assert_eq!(ten.deduct_from(Decimal::MAX), None);
        assert!(Percent::from_str("0")
            .unwrap()
            .deduct_from(decimal("1000000000000000"))
            .is_some());
    }
}
