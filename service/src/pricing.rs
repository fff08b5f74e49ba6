//! Resolution of nightly rates.

use common::{Date, Money, Stay};
use derive_more::{Display, Error};

use crate::domain::{inventory, PromoCode, RoomType};

/// Returns the rate of the [`RoomType`] for the provided `night`, discounted
/// by the [`PromoCode`] if it applies to that night.
///
/// The rate of the night's [`inventory::Record`], if any, overrides the
/// [`RoomType::base_price`].
///
/// # Errors
///
/// If the discounted rate overflows.
pub fn nightly_rate(
    room_type: &RoomType,
    night: Date,
    record: Option<&inventory::Record>,
    promo: Option<&PromoCode>,
) -> Result<Money, Overflow> {
    let base = record.and_then(|r| r.rate).unwrap_or(room_type.base_price);
    match promo {
        Some(p) if p.discounts(room_type.id, night) => p
            .discount
            .apply(base.amount)
            .map(|amount| base.with_amount(amount))
            .ok_or(Overflow),
        _ => Ok(base),
    }
}

/// Priced [`Stay`] in a [`RoomType`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Rate of every night of the [`Stay`], in order.
    pub nights: Vec<(Date, Money)>,

    /// Sum of all the nightly rates.
    pub total: Money,
}

impl Quote {
    /// Prices every night of the [`Stay`] in the [`RoomType`].
    ///
    /// `records` may contain [`inventory::Record`]s of other [`RoomType`]s or
    /// nights, they're ignored.
    ///
    /// # Errors
    ///
    /// If some nightly rate or the total overflows, or nightly rates are in
    /// different currencies.
    pub fn new(
        room_type: &RoomType,
        stay: Stay,
        records: &[inventory::Record],
        promo: Option<&PromoCode>,
    ) -> Result<Self, Overflow> {
        let nights = stay
            .nights()
            .map(|n| {
                let record = inventory::record_of(room_type.id, n, records);
                nightly_rate(room_type, n, record, promo).map(|m| (n, m))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total = Money::sum_in(
            room_type.base_price.currency,
            nights.iter().map(|(_, m)| *m),
        )
        .ok_or(Overflow)?;
        Ok(Self { nights, total })
    }

    /// Returns the rate of the first night.
    #[must_use]
    pub fn first_night_rate(&self) -> Option<Money> {
        self.nights.first().map(|(_, m)| *m)
    }
}

/// Error of a price not fitting into [`Money`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("price overflows")]
pub struct Overflow;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{money::Currency, Date, DateTime, Money, Percent, Stay};
    use rust_decimal::Decimal;

    use crate::domain::{
        inventory,
        promo::{self, Discount},
        room_type, PromoCode, RoomType,
    };

    use super::{nightly_rate, Overflow, Quote};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn idr(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Idr,
        }
    }

    fn deluxe() -> RoomType {
        RoomType {
            id: room_type::Id::new(),
            name: room_type::Name::new("Deluxe").unwrap(),
            base_price: idr(1_000_000),
            total_units: 3,
            is_active: true,
            created_at: DateTime::now().coerce(),
        }
    }

    fn promo(discount: Discount) -> PromoCode {
        PromoCode {
            code: promo::Code::new("SAVE").unwrap(),
            discount,
            max_usage: 10,
            current_usage: 0,
            room_type_ids: vec![],
            valid_from: date("2025-01-01"),
            valid_until: date("2025-01-31"),
            is_active: true,
            created_at: DateTime::now().coerce(),
        }
    }

    fn ten_percent() -> Discount {
        Discount::Percentage(Percent::from_str("10").unwrap())
    }

    #[test]
    fn ten_percent_off_two_nights() {
        let rt = deluxe();
        let p = promo(ten_percent());
        let stay = Stay::new(date("2025-01-18"), date("2025-01-20")).unwrap();

        let quote = Quote::new(&rt, stay, &[], Some(&p)).unwrap();

        assert_eq!(quote.total, idr(1_800_000));
        assert_eq!(quote.first_night_rate(), Some(idr(900_000)));
        assert_eq!(quote.nights.len(), 2);
    }

    #[test]
    fn base_rate_without_promo() {
        let rt = deluxe();
        let stay = Stay::new(date("2025-01-18"), date("2025-01-21")).unwrap();

        let quote = Quote::new(&rt, stay, &[], None).unwrap();

        assert_eq!(quote.total, idr(3_000_000));
    }

    #[test]
    fn discount_only_inside_window() {
        let rt = deluxe();
        let p = promo(ten_percent());
        let stay = Stay::new(date("2025-01-30"), date("2025-02-02")).unwrap();

        let quote = Quote::new(&rt, stay, &[], Some(&p)).unwrap();

        assert_eq!(
            quote.nights,
            vec![
                (date("2025-01-30"), idr(900_000)),
                (date("2025-01-31"), idr(900_000)),
                (date("2025-02-01"), idr(1_000_000)),
            ],
        );
        assert_eq!(quote.total, idr(2_800_000));
    }

    #[test]
    fn ignores_promo_for_other_room_types() {
        let rt = deluxe();
        let p = PromoCode {
            room_type_ids: vec![room_type::Id::new()],
            ..promo(ten_percent())
        };

        assert_eq!(
            nightly_rate(&rt, date("2025-01-10"), None, Some(&p)),
            Ok(idr(1_000_000)),
        );
    }

    #[test]
    fn ignores_exhausted_promo() {
        let rt = deluxe();
        let p = PromoCode {
            current_usage: 10,
            ..promo(ten_percent())
        };

        assert_eq!(
            nightly_rate(&rt, date("2025-01-10"), None, Some(&p)),
            Ok(idr(1_000_000)),
        );
    }

    #[test]
    fn fixed_discount_floors_at_zero() {
        let rt = deluxe();
        let p = promo(Discount::FixedAmount(Decimal::from(1_500_000)));

        assert_eq!(
            nightly_rate(&rt, date("2025-01-10"), None, Some(&p)),
            Ok(idr(0)),
        );
    }

    #[test]
    fn record_rate_overrides_base_price() {
        let rt = deluxe();
        let p = promo(ten_percent());
        let stay = Stay::new(date("2025-01-18"), date("2025-01-20")).unwrap();
        let records = [inventory::Record {
            rate: Some(idr(1_200_000)),
            ..inventory::Record::vacant(&rt, date("2025-01-19"))
        }];

        let quote = Quote::new(&rt, stay, &records, Some(&p)).unwrap();

        assert_eq!(
            quote.nights,
            vec![
                (date("2025-01-18"), idr(900_000)),
                (date("2025-01-19"), idr(1_080_000)),
            ],
        );
        assert_eq!(quote.total, idr(1_980_000));
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let rt = RoomType {
            base_price: idr(0).with_amount(Decimal::MAX),
            ..deluxe()
        };
        let stay = Stay::new(date("2025-01-18"), date("2025-01-20")).unwrap();

        assert_eq!(Quote::new(&rt, stay, &[], None), Err(Overflow));
    }
}
