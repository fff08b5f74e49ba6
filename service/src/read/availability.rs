//! Availability search read definitions.

use crate::{
    domain::{room_type, RoomType},
    pricing::Quote,
};

/// [`RoomType`] bookable for a whole requested stay.
#[derive(Clone, Debug)]
pub struct Offer {
    /// Offered [`RoomType`].
    pub room_type: RoomType,

    /// Number of units free on every night of the stay.
    pub available_units: room_type::Units,

    /// Price of the stay.
    pub quote: Quote,
}
