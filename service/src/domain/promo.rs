//! [`PromoCode`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, money, unit, Date, DateTimeOf, Percent, Stay};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::room_type;
#[cfg(doc)]
use crate::domain::{Reservation, RoomType};

/// Code granting a discount on [`RoomType`] nightly rates.
#[derive(Clone, Debug)]
pub struct PromoCode {
    /// [`Code`] guests enter to redeem this [`PromoCode`].
    pub code: Code,

    /// [`Discount`] granted by this [`PromoCode`].
    pub discount: Discount,

    /// Maximum number of [`Reservation`]s allowed to use this [`PromoCode`].
    pub max_usage: Usage,

    /// Number of [`Reservation`]s that have used this [`PromoCode`] already.
    pub current_usage: Usage,

    /// IDs of the [`RoomType`]s this [`PromoCode`] is restricted to.
    ///
    /// Empty means all [`RoomType`]s.
    pub room_type_ids: Vec<room_type::Id>,

    /// First day this [`PromoCode`] is valid on.
    pub valid_from: Date,

    /// Last day this [`PromoCode`] is valid on.
    pub valid_until: Date,

    /// Indicator whether this [`PromoCode`] is enabled.
    pub is_active: bool,

    /// [`DateTime`] when this [`PromoCode`] was created.
    pub created_at: CreationDateTime,
}

impl PromoCode {
    /// Indicates whether this [`PromoCode`] can be redeemed on the provided
    /// `day` at all.
    #[must_use]
    pub fn is_valid_on(&self, day: Date) -> bool {
        self.is_active
            && !self.is_exhausted()
            && self.valid_from <= day
            && day <= self.valid_until
    }

    /// Indicates whether this [`PromoCode`] has been used the maximum number
    /// of times.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current_usage >= self.max_usage
    }

    /// Indicates whether this [`PromoCode`] may be used for the provided
    /// [`RoomType`].
    #[must_use]
    pub fn covers(&self, room_type_id: room_type::Id) -> bool {
        self.room_type_ids.is_empty()
            || self.room_type_ids.contains(&room_type_id)
    }

    /// Indicates whether this [`PromoCode`] discounts the night of the
    /// provided [`RoomType`].
    #[must_use]
    pub fn discounts(&self, room_type_id: room_type::Id, night: Date) -> bool {
        self.covers(room_type_id) && self.is_valid_on(night)
    }

    /// Indicates whether this [`PromoCode`] may be redeemed `today` for the
    /// provided [`Stay`] of the [`RoomType`].
    ///
    /// Every night of the [`Stay`] must be discounted, otherwise the guest
    /// would spend a usage on a partially discounted stay.
    #[must_use]
    pub fn applies_to_stay(
        &self,
        room_type_id: room_type::Id,
        stay: Stay,
        today: Date,
    ) -> bool {
        self.is_valid_on(today)
            && stay.nights().all(|n| self.discounts(room_type_id, n))
    }
}

/// Case-insensitive code of a [`PromoCode`], stored upper-cased.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Creates a new upper-cased [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Option<Self> {
        let code = code.as_ref().trim().to_uppercase();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given upper-cased `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Code`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Z0-9][A-Z0-9_-]{1,30}[A-Z0-9]$")
                .expect("valid regex")
        });

        REGEX.is_match(code.as_ref())
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `promo::Code`")
    }
}

/// Discount rule of a [`PromoCode`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Discount {
    /// Nightly rate is reduced by the [`Percent`] of it.
    Percentage(Percent),

    /// Nightly rate is reduced by the fixed amount.
    FixedAmount(Decimal),
}

impl Discount {
    /// Creates a new [`Discount`] of the provided [`DiscountKind`].
    ///
    /// [`None`] is returned if the `value` doesn't fit the [`DiscountKind`].
    #[must_use]
    pub fn new(kind: DiscountKind, value: Decimal) -> Option<Self> {
        match kind {
            DiscountKind::Percentage => Percent::new(value).map(Self::Percentage),
            DiscountKind::FixedAmount => money::is_valid_price(value)
                .then_some(Self::FixedAmount(value)),
        }
    }

    /// Returns [`DiscountKind`] of this [`Discount`].
    #[must_use]
    pub fn kind(&self) -> DiscountKind {
        match self {
            Self::Percentage(_) => DiscountKind::Percentage,
            Self::FixedAmount(_) => DiscountKind::FixedAmount,
        }
    }

    /// Returns the raw value of this [`Discount`].
    #[must_use]
    pub fn value(&self) -> Decimal {
        match self {
            Self::Percentage(p) => p.value(),
            Self::FixedAmount(a) => *a,
        }
    }

    /// Applies this [`Discount`] to the provided nightly `rate`.
    ///
    /// The result is never negative. [`None`] is returned on overflow.
    #[must_use]
    pub fn apply(&self, rate: Decimal) -> Option<Decimal> {
        match self {
            Self::Percentage(p) => p.deduct_from(rate),
            Self::FixedAmount(a) => {
                rate.checked_sub(*a).map(|r| r.max(Decimal::ZERO))
            }
        }
    }
}

define_kind! {
    #[doc = "Kind of a [`Discount`]."]
    enum DiscountKind {
        #[doc = "[`Discount::Percentage`]."]
        Percentage = 1,

        #[doc = "[`Discount::FixedAmount`]."]
        FixedAmount = 2,
    }
}

/// Number of [`PromoCode`] usages.
pub type Usage = u32;

/// Single use of a [`PromoCode`] by a [`Reservation`].
#[derive(Clone, Debug)]
pub struct Redemption {
    /// [`Code`] of the redeemed [`PromoCode`].
    pub code: Code,
}

/// [`DateTime`] when a [`PromoCode`] was created.
pub type CreationDateTime = DateTimeOf<(PromoCode, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, DateTime, Percent, Stay};
    use rust_decimal::Decimal;

    use crate::domain::room_type;

    use super::{Code, Discount, DiscountKind, PromoCode};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn promo() -> PromoCode {
        PromoCode {
            code: Code::new("WINTER10").unwrap(),
            discount: Discount::Percentage(Percent::from_str("10").unwrap()),
            max_usage: 3,
            current_usage: 0,
            room_type_ids: vec![],
            valid_from: date("2025-01-01"),
            valid_until: date("2025-01-31"),
            is_active: true,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn code_is_normalized() {
        assert_eq!(Code::new(" winter10 ").unwrap().to_string(), "WINTER10");
        assert_eq!(Code::new("early-bird").unwrap().to_string(), "EARLY-BIRD");

        assert!(Code::new("").is_none());
        assert!(Code::new("A").is_none());
        assert!(Code::new("NO SPACES").is_none());
        assert!(Code::new("-DASH").is_none());
    }

    #[test]
    fn window_is_inclusive() {
        let p = promo();

        assert!(p.is_valid_on(date("2025-01-01")));
        assert!(p.is_valid_on(date("2025-01-31")));
        assert!(!p.is_valid_on(date("2024-12-31")));
        assert!(!p.is_valid_on(date("2025-02-01")));
    }

    #[test]
    fn inactive_or_exhausted_is_invalid() {
        let inactive = PromoCode {
            is_active: false,
            ..promo()
        };
        assert!(!inactive.is_valid_on(date("2025-01-10")));

        let exhausted = PromoCode {
            current_usage: 3,
            ..promo()
        };
        assert!(exhausted.is_exhausted());
        assert!(!exhausted.is_valid_on(date("2025-01-10")));
    }

    #[test]
    fn room_type_restriction() {
        let allowed = room_type::Id::new();
        let other = room_type::Id::new();

        assert!(promo().covers(other));

        let restricted = PromoCode {
            room_type_ids: vec![allowed],
            ..promo()
        };
        assert!(restricted.discounts(allowed, date("2025-01-10")));
        assert!(!restricted.discounts(other, date("2025-01-10")));
    }

    #[test]
    fn discount_never_goes_negative() {
        let fixed = Discount::FixedAmount(Decimal::from(150_000));
        assert_eq!(
            fixed.apply(Decimal::from(500_000)),
            Some(Decimal::from(350_000)),
        );
        assert_eq!(fixed.apply(Decimal::from(100_000)), Some(Decimal::ZERO));

        let pct = Discount::Percentage(Percent::from_str("10").unwrap());
        assert_eq!(
            pct.apply(Decimal::from(1_000_000)),
            Some(Decimal::from(900_000)),
        );
    }

    #[test]
    fn fixed_amount_must_be_a_valid_price() {
        let kind = DiscountKind::FixedAmount;

        assert!(Discount::new(kind, Decimal::from(50_000)).is_some());
        assert!(Discount::new(kind, Decimal::ZERO).is_some());
        assert!(Discount::new(kind, Decimal::from(-1)).is_none());
        assert!(Discount::new(kind, Decimal::new(15, 1)).is_none());
        assert!(Discount::new(kind, Decimal::MAX).is_none());
    }

    #[test]
    fn stay_must_be_discounted_on_every_night() {
        let rt = room_type::Id::new();
        let today = date("2025-01-10");
        let inside = Stay::new(date("2025-01-20"), date("2025-01-23")).unwrap();
        let crossing =
            Stay::new(date("2025-01-30"), date("2025-02-02")).unwrap();
        let after = Stay::new(date("2025-02-10"), date("2025-02-12")).unwrap();

        assert!(promo().applies_to_stay(rt, inside, today));
        assert!(!promo().applies_to_stay(rt, crossing, today));
        assert!(!promo().applies_to_stay(rt, after, today));
        assert!(!promo().applies_to_stay(rt, inside, date("2024-12-20")));
    }
}
