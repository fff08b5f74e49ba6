//! [`PromoCode`]-related definitions.

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use rust_decimal::Decimal;
use service::domain::{self, promo};

use crate::{
    api::{self, scalar},
    Context,
};

/// A code granting a discount on nightly rates.
#[derive(Clone, Debug, From, Into)]
pub struct PromoCode(domain::PromoCode);

/// A code granting a discount on nightly rates.
#[graphql_object(context = Context)]
impl PromoCode {
    /// Code guests enter to redeem this `PromoCode`.
    #[must_use]
    pub fn code(&self) -> Code {
        self.0.code.clone().into()
    }

    /// Kind of the discount granted by this `PromoCode`.
    #[must_use]
    pub fn discount_kind(&self) -> DiscountKind {
        self.0.discount.kind().into()
    }

    /// Value of the discount: percents for `PERCENTAGE` kind, or an amount in
    /// the `RoomType` currency for `FIXED_AMOUNT` kind.
    #[must_use]
    pub fn discount_value(&self) -> DiscountValue {
        self.0.discount.value().into()
    }

    /// Maximum number of redemptions of this `PromoCode`.
    #[must_use]
    pub fn max_usage(&self) -> api::Count {
        self.0.max_usage.into()
    }

    /// Number of redemptions of this `PromoCode` so far.
    #[must_use]
    pub fn current_usage(&self) -> api::Count {
        self.0.current_usage.into()
    }

    /// IDs of the `RoomType`s this `PromoCode` is restricted to.
    ///
    /// Empty means all `RoomType`s.
    #[must_use]
    pub fn room_type_ids(&self) -> Vec<api::room_type::Id> {
        self.0.room_type_ids.iter().copied().map(Into::into).collect()
    }

    /// First day this `PromoCode` is valid on.
    #[must_use]
    pub fn valid_from(&self) -> Date {
        self.0.valid_from
    }

    /// Last day this `PromoCode` is valid on.
    #[must_use]
    pub fn valid_until(&self) -> Date {
        self.0.valid_until
    }

    /// Indicator whether this `PromoCode` is enabled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.is_active
    }

    /// `DateTime` when this `PromoCode` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Case-insensitive code of a `PromoCode`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "PromoCodeCode", with = scalar::Via::<promo::Code>)]
pub struct Code(promo::Code);

/// Non-negative decimal value of a `PromoCode` discount.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "DiscountValue", with = scalar::Via::<Decimal>)]
pub struct DiscountValue(Decimal);

/// Kind of a `PromoCode` discount.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "DiscountKind")]
pub enum DiscountKind {
    /// Nightly rate is reduced by a percentage of it.
    Percentage,

    /// Nightly rate is reduced by a fixed amount, never below zero.
    FixedAmount,
}

impl From<promo::DiscountKind> for DiscountKind {
    fn from(kind: promo::DiscountKind) -> Self {
        use promo::DiscountKind as K;
        match kind {
            K::Percentage => Self::Percentage,
            K::FixedAmount => Self::FixedAmount,
        }
    }
}

impl From<DiscountKind> for promo::DiscountKind {
    fn from(kind: DiscountKind) -> Self {
        match kind {
            DiscountKind::Percentage => Self::Percentage,
            DiscountKind::FixedAmount => Self::FixedAmount,
        }
    }
}
