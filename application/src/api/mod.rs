//! GraphQL API definitions.

pub mod availability;
pub mod dashboard;
pub mod inventory;
mod mutation;
pub mod promo;
mod query;
pub mod reservation;
pub mod room_type;
pub mod scalar;

use juniper::{EmptySubscription, GraphQLScalar};

use crate::{define_error, Context};

pub use self::{
    availability::Offer,
    dashboard::Dashboard,
    inventory::InventoryRecord,
    mutation::Mutation,
    promo::PromoCode,
    query::Query,
    reservation::Reservation,
    room_type::RoomType,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

/// Non-negative count of something, fitting into `T`.
#[derive(Clone, Copy, Debug, GraphQLScalar)]
#[graphql(name = "Count", transparent)]
pub struct Count(i32);

impl Count {
    /// Converts this [`Count`] into the `T` it must fit into.
    ///
    /// # Errors
    ///
    /// Errors with [`InputError::CountOutOfRange`] if this [`Count`] is
    /// negative or too large for `T`.
    pub fn fit<T: TryFrom<i32>>(self) -> Result<T, InputError> {
        T::try_from(self.0).map_err(|_| InputError::CountOutOfRange)
    }
}

impl From<u16> for Count {
    fn from(n: u16) -> Self {
        Self(n.into())
    }
}

impl From<u32> for Count {
    fn from(n: u32) -> Self {
        Self(i32::try_from(n).unwrap_or(i32::MAX))
    }
}

define_error! {
    enum InputError {
        #[code = "COUNT_OUT_OF_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Provided `Count` is negative or too large"]
        CountOutOfRange,
    }
}

define_error! {
    enum StayError {
        #[code = "INVALID_STAY"]
        #[status = BAD_REQUEST]
        #[message = "`checkOut` must be later than `checkIn`"]
        Invalid,
    }
}

define_error! {
    enum DateRangeError {
        #[code = "INVALID_DATE_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "`endDate` must not be earlier than `startDate`"]
        Invalid,
    }
}

define_error! {
    enum RoomTypeError {
        #[code = "ROOM_TYPE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`RoomType` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ReservationError {
        #[code = "RESERVATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Reservation` with the specified ID or booking code \
                     does not exist"]
        NotExists,

        #[code = "INVALID_STATUS_TRANSITION"]
        #[status = BAD_REQUEST]
        #[message = "`Reservation` cannot move into the requested status"]
        InvalidStatusTransition,
    }
}

define_error! {
    enum PriceError {
        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price must be a non-negative whole amount not exceeding \
                     10^18"]
        Invalid,

        #[code = "PRICE_OVERFLOW"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "Price of the requested stay is too large"]
        Overflow,
    }
}

define_error! {
    enum PromoError {
        #[code = "PROMO_CODE_NOT_EXISTS"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`PromoCode` with the specified code does not exist"]
        NotExists,

        #[code = "PROMO_CODE_NOT_APPLICABLE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`PromoCode` cannot be used for the requested booking"]
        NotApplicable,
    }
}

#[cfg(test)]
mod spec {
    use super::{Count, InputError};

    #[test]
    fn count_must_fit() {
        assert_eq!(Count(3).fit::<u16>().unwrap(), 3);
        assert!(matches!(
            Count(-1).fit::<u16>(),
            Err(InputError::CountOutOfRange),
        ));
        assert!(matches!(
            Count(70_000).fit::<u16>(),
            Err(InputError::CountOutOfRange),
        ));
        assert_eq!(Count(70_000).fit::<u32>().unwrap(), 70_000);
    }
}
