//! [`Dashboard`]-related definitions.

use common::{Date, Money};
use derive_more::{From, Into};
use juniper::graphql_object;
use service::read;

use crate::{api, Context};

/// Summary of the hotel state on a single day.
#[derive(Clone, Debug, From, Into)]
pub struct Dashboard(read::Dashboard);

/// Summary of the hotel state on a single day.
#[graphql_object(context = Context)]
impl Dashboard {
    /// Day this `Dashboard` summarizes.
    #[must_use]
    pub fn date(&self) -> Date {
        self.0.date
    }

    /// Number of rooms of the active `RoomType`s sold for the night.
    #[must_use]
    pub fn occupied_rooms(&self) -> api::Count {
        self.0.occupied_units.into()
    }

    /// Number of rooms of the active `RoomType`s still bookable for the
    /// night.
    #[must_use]
    pub fn available_rooms(&self) -> api::Count {
        self.0.available_units.into()
    }

    /// Total amount of the confirmed and completed `Reservation`s checking
    /// in during the month of the `date`, one per currency.
    #[must_use]
    pub fn monthly_revenue(&self) -> Vec<Money> {
        self.0.monthly_revenue.clone()
    }

    /// Number of all the `RoomType`s, including inactive ones.
    #[must_use]
    pub fn total_room_types(&self) -> api::Count {
        self.0.total_room_types.into()
    }

    /// Latest `Reservation`s, most recent first.
    #[must_use]
    pub fn recent_reservations(&self) -> Vec<api::Reservation> {
        self.0
            .recent_reservations
            .iter()
            .cloned()
            .map(Into::into)
            .collect()
    }
}
