//! [`Offer`]-related definitions.

use common::{Date, Money};
use derive_more::{From, Into};
use juniper::graphql_object;
use service::read;

use crate::{api, Context};

/// A `RoomType` bookable for every night of a requested stay.
#[derive(Clone, Debug, From, Into)]
pub struct Offer(read::Offer);

/// A `RoomType` bookable for every night of a requested stay.
#[graphql_object(context = Context)]
impl Offer {
    /// Offered `RoomType`.
    #[must_use]
    pub fn room_type(&self) -> api::RoomType {
        self.0.room_type.clone().into()
    }

    /// Number of units free on every night of the stay.
    #[must_use]
    pub fn available_units(&self) -> api::Count {
        self.0.available_units.into()
    }

    /// Rate of the first night of the stay, discounted if a `PromoCode`
    /// applies to it.
    #[must_use]
    pub fn nightly_rate(&self) -> Option<Money> {
        self.0.quote.first_night_rate()
    }

    /// Rate of every night of the stay, in order.
    #[must_use]
    pub fn nights(&self) -> Vec<NightlyRate> {
        self.0
            .quote
            .nights
            .iter()
            .map(|&(date, rate)| NightlyRate { date, rate })
            .collect()
    }

    /// Price of the whole stay.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.0.quote.total
    }
}

/// Rate of a single night.
#[derive(Clone, Copy, Debug)]
pub struct NightlyRate {
    /// Night the rate is for.
    date: Date,

    /// Rate of the night.
    rate: Money,
}

/// Rate of a single night.
#[graphql_object(context = Context)]
impl NightlyRate {
    /// Night this rate is for.
    #[must_use]
    pub fn date(&self) -> Date {
        self.date
    }

    /// Rate of the night.
    #[must_use]
    pub fn rate(&self) -> Money {
        self.rate
    }
}
