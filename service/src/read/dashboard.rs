//! Administration dashboard read definitions.

use common::{Date, Money};

use crate::domain::Reservation;
#[cfg(doc)]
use crate::domain::{reservation, RoomType};

/// Number of the latest [`Reservation`]s shown on a [`Dashboard`].
pub const RECENT_RESERVATIONS: u16 = 5;

/// Summary of the hotel state on a single [`Date`].
#[derive(Clone, Debug)]
pub struct Dashboard {
    /// [`Date`] this [`Dashboard`] summarizes.
    pub date: Date,

    /// Number of units of the active [`RoomType`]s sold for the night.
    pub occupied_units: u32,

    /// Number of units of the active [`RoomType`]s still bookable for the
    /// night.
    pub available_units: u32,

    /// Total amount of the [`reservation::Status::Confirmed`] and
    /// [`reservation::Status::Completed`] [`Reservation`]s checking in
    /// during the month of [`Dashboard::date`], one per currency.
    pub monthly_revenue: Vec<Money>,

    /// Number of all the [`RoomType`]s, including inactive ones.
    pub total_room_types: u32,

    /// Latest [`Reservation`]s, most recent first.
    pub recent_reservations: Vec<Reservation>,
}
