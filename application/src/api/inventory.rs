//! [`InventoryRecord`]-related definitions.

use common::{Date, Money};
use derive_more::{From, Into};
use juniper::graphql_object;
use service::domain::inventory;

use crate::{api, Context};

/// Units of a `RoomType` sold and sellable on a single night, along with the
/// rate and sale status of the night.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct InventoryRecord(inventory::Record);

/// Units of a `RoomType` sold and sellable on a single night.
#[graphql_object(context = Context)]
impl InventoryRecord {
    /// ID of the `RoomType` this `InventoryRecord` belongs to.
    #[must_use]
    pub fn room_type_id(&self) -> api::room_type::Id {
        self.0.room_type_id.into()
    }

    /// Night this `InventoryRecord` describes.
    #[must_use]
    pub fn date(&self) -> Date {
        self.0.date
    }

    /// Number of units sellable on the night.
    #[must_use]
    pub fn total_units(&self) -> api::Count {
        self.0.total_units.into()
    }

    /// Number of units already sold on the night.
    #[must_use]
    pub fn sold_units(&self) -> api::Count {
        self.0.sold_units.into()
    }

    /// Number of units still available on the night.
    ///
    /// Always zero on closed nights.
    #[must_use]
    pub fn available_units(&self) -> api::Count {
        self.0.available_units().into()
    }

    /// Rate of the night overriding the `basePrice` of the `RoomType`.
    #[must_use]
    pub fn rate(&self) -> Option<Money> {
        self.0.rate
    }

    /// Indicator whether the sale of the night is stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.is_closed
    }
}
