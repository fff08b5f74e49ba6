//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
use rust_decimal::Decimal;

use crate::define_kind;

/// Largest whole number of currency units a price may have.
pub const MAX_PRICE_UNITS: i64 = 1_000_000_000_000_000;

/// Indicates whether the provided `amount` is a whole number of currency
/// units within `0..=`[`MAX_PRICE_UNITS`].
#[must_use]
pub fn is_valid_price(amount: Decimal) -> bool {
    amount >= Decimal::ZERO
        && amount.fract().is_zero()
        && amount <= Decimal::from(MAX_PRICE_UNITS)
}

/// Amount of money in some [`Currency`], like a nightly rate or a
/// reservation total.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Returns the same [`Currency`] with another `amount`.
    #[must_use]
    pub const fn with_amount(self, amount: Decimal) -> Self {
        Self {
            amount,
            currency: self.currency,
        }
    }

    /// Indicates whether this [`Money`] may be used as a price.
    ///
    /// See [`is_valid_price()`] for details.
    #[must_use]
    pub fn is_valid_price(&self) -> bool {
        is_valid_price(self.amount)
    }

    /// Sums the provided `amounts` in the same [`Currency`].
    ///
    /// [`None`] is returned if some `amount` is in another [`Currency`] or
    /// the sum overflows. Nothing sums up to zero.
    pub fn sum_in(
        currency: Currency,
        amounts: impl IntoIterator<Item = Self>,
    ) -> Option<Self> {
        amounts.into_iter().try_fold(
            Self {
                amount: Decimal::ZERO,
                currency,
            },
            |acc, m| {
                (m.currency == currency)
                    .then(|| acc.amount.checked_add(m.amount))
                    .flatten()
                    .map(|amount| acc.with_amount(amount))
            },
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount.normalize(), self.currency)
    }
}

/// Error of parsing [`Money`] from a `{amount}{currency}` string.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum ParseError {
    /// No three-letter [`Currency`] code at the end.
    #[display("missing currency code")]
    NoCurrency,

    /// [`Currency`] code is not a known one.
    #[display("unknown currency code")]
    UnknownCurrency,

    /// Amount is not a decimal number.
    #[display("invalid amount")]
    InvalidAmount,
}

impl FromStr for Money {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        let code = &s[amount.len()..];
        if code.len() != 3 {
            return Err(ParseError::NoCurrency);
        }

        Ok(Self {
            amount: Decimal::from_str(amount)
                .map_err(|_| ParseError::InvalidAmount)?,
            currency: Currency::from_str(code)
                .map_err(|_| ParseError::UnknownCurrency)?,
        })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Indonesian Rupiah."]
        Idr = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{amount}{currency}` format, where `amount` is a decimal
    /// number and `currency` is a three-letter currency code, like
    /// `900000IDR` or `120.50USD`.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money, ParseError, MAX_PRICE_UNITS};

    fn money(amount: &str, currency: Currency) -> Money {
        Money {
            amount: amount.parse().unwrap(),
            currency,
        }
    }

    #[test]
    fn parses_amount_and_code() {
        assert_eq!(
            Money::from_str("1800000IDR"),
            Ok(money("1800000", Currency::Idr)),
        );
        assert_eq!(
            Money::from_str("120.50USD"),
            Ok(money("120.5", Currency::Usd)),
        );
        assert_eq!(Money::from_str("99EUR"), Ok(money("99", Currency::Eur)));

        assert_eq!(Money::from_str("120.50"), Err(ParseError::NoCurrency));
        assert_eq!(Money::from_str("120US"), Err(ParseError::NoCurrency));
        assert_eq!(Money::from_str("120Usdx"), Err(ParseError::NoCurrency));
        assert_eq!(Money::from_str("120GBP"), Err(ParseError::UnknownCurrency));
        assert_eq!(Money::from_str("1.2.3USD"), Err(ParseError::InvalidAmount));
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(money("900000.00", Currency::Idr).to_string(), "900000IDR");
        assert_eq!(money("120.50", Currency::Usd).to_string(), "120.5USD");
        assert_eq!(money("0", Currency::Eur).to_string(), "0EUR");
    }

    #[test]
    fn prices_are_whole_and_bounded() {
        assert!(money("0", Currency::Idr).is_valid_price());
        assert!(money("1500000", Currency::Idr).is_valid_price());
        assert!(money("120.00", Currency::Usd).is_valid_price());
        assert!(money(&MAX_PRICE_UNITS.to_string(), Currency::Idr)
            .is_valid_price());

        assert!(!money("120.50", Currency::Usd).is_valid_price());
        assert!(!money("-1", Currency::Idr).is_valid_price());
        assert!(!money("1000000000000001", Currency::Idr).is_valid_price());
        assert!(!Money {
            amount: Decimal::MAX,
            currency: Currency::Eur,
        }
        .is_valid_price());
    }

    #[test]
    fn sums_same_currency_only() {
        let night = money("900000", Currency::Idr);

        assert_eq!(
            Money::sum_in(Currency::Idr, [night, night]),
            Some(money("1800000", Currency::Idr)),
        );
        assert_eq!(
            Money::sum_in(Currency::Usd, []),
            Some(money("0", Currency::Usd)),
        );
        assert_eq!(Money::sum_in(Currency::Usd, [night]), None);
        assert_eq!(
            Money::sum_in(
                Currency::Idr,
                [night, night.with_amount(Decimal::MAX)],
            ),
            None,
        );
    }
}
