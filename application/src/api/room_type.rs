//! [`RoomType`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A kind of room sold by the hotel.
#[derive(Clone, Debug, From, Into)]
pub struct RoomType(domain::RoomType);

/// A kind of room sold by the hotel.
#[graphql_object(context = Context)]
impl RoomType {
    /// Unique identifier of this `RoomType`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Display name of this `RoomType`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Nightly rate of this `RoomType` before any discounts.
    #[must_use]
    pub fn base_price(&self) -> Money {
        self.0.base_price
    }

    /// Default number of units of this `RoomType` sellable per night.
    #[must_use]
    pub fn total_units(&self) -> api::Count {
        self.0.total_units.into()
    }

    /// Indicator whether this `RoomType` can be booked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.is_active
    }

    /// `DateTime` when this `RoomType` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `RoomType`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::room_type::Id)]
#[into(domain::room_type::Id)]
#[graphql(name = "RoomTypeId", transparent)]
pub struct Id(Uuid);

/// Display name of a `RoomType`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RoomTypeName",
    with = scalar::Via::<domain::room_type::Name>,
)]
pub struct Name(domain::room_type::Name);
