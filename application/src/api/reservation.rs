//! [`Reservation`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A booking of one room for a stay.
#[derive(Clone, Debug, From, Into)]
pub struct Reservation(domain::Reservation);

/// A booking of one room for a stay.
#[graphql_object(context = Context)]
impl Reservation {
    /// Unique identifier of this `Reservation`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Code given to the guest to refer to this `Reservation`.
    #[must_use]
    pub fn booking_code(&self) -> BookingCode {
        self.0.booking_code.clone().into()
    }

    /// Full name of the guest.
    #[must_use]
    pub fn guest_name(&self) -> GuestName {
        self.0.guest.name.clone().into()
    }

    /// Email of the guest.
    #[must_use]
    pub fn guest_email(&self) -> Email {
        self.0.guest.email.clone().into()
    }

    /// Phone number of the guest.
    #[must_use]
    pub fn guest_phone(&self) -> Phone {
        self.0.guest.phone.clone().into()
    }

    /// Booked `RoomType`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_TYPE_NOT_EXISTS` - the `RoomType` has been removed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.roomType",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn room_type(
        &self,
        ctx: &Context,
    ) -> Result<api::RoomType, Error> {
        ctx.service()
            .execute(query::room_type::ById::by(self.0.room_type_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::RoomTypeError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// First booked night.
    #[must_use]
    pub fn check_in(&self) -> Date {
        self.0.stay.check_in()
    }

    /// Departure date. Its night is not booked.
    #[must_use]
    pub fn check_out(&self) -> Date {
        self.0.stay.check_out()
    }

    /// Number of booked nights.
    #[must_use]
    pub fn nights(&self) -> api::Count {
        self.0.stay.num_nights().into()
    }

    /// Number of people staying.
    #[must_use]
    pub fn guests(&self) -> api::Count {
        u16::from(self.0.guests).into()
    }

    /// Total price of all the booked nights.
    #[must_use]
    pub fn total_amount(&self) -> Money {
        self.0.total_amount
    }

    /// Current status of this `Reservation`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Code of the `PromoCode` applied to this `Reservation`, if any.
    #[must_use]
    pub fn promo_code(&self) -> Option<api::promo::Code> {
        self.0.promo_code.clone().map(Into::into)
    }

    /// Wishes of the guest regarding the stay, if any.
    #[must_use]
    pub fn special_requests(&self) -> Option<SpecialRequests> {
        self.0.special_requests.clone().map(Into::into)
    }

    /// `DateTime` when this `Reservation` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Reservation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::reservation::Id)]
#[into(domain::reservation::Id)]
#[graphql(name = "ReservationId", transparent)]
pub struct Id(Uuid);

/// Eight alphanumeric characters identifying a `Reservation`.
///
/// Case-insensitive on input.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BookingCode",
    with = scalar::Via::<domain::reservation::BookingCode>,
)]
pub struct BookingCode(domain::reservation::BookingCode);

/// Full name of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestName",
    with = scalar::Via::<domain::reservation::GuestName>,
)]
pub struct GuestName(domain::reservation::GuestName);

/// Email address of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestEmail",
    with = scalar::Via::<domain::reservation::Email>,
)]
pub struct Email(domain::reservation::Email);

/// Phone number of a guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "GuestPhone",
    with = scalar::Via::<domain::reservation::Phone>,
)]
pub struct Phone(domain::reservation::Phone);

/// Free-form wishes of a guest regarding the stay.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "SpecialRequests",
    with = scalar::Via::<domain::reservation::SpecialRequests>,
)]
pub struct SpecialRequests(domain::reservation::SpecialRequests);

/// Lifecycle status of a `Reservation`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ReservationStatus")]
pub enum Status {
    /// Holds a room, awaiting confirmation by the hotel.
    Pending,

    /// Confirmed by the hotel.
    Confirmed,

    /// Cancelled, the room is released.
    Cancelled,

    /// The stay is over.
    Completed,
}

impl From<domain::reservation::Status> for Status {
    fn from(status: domain::reservation::Status) -> Self {
        use domain::reservation::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Confirmed => Self::Confirmed,
            S::Cancelled => Self::Cancelled,
            S::Completed => Self::Completed,
        }
    }
}

impl From<Status> for domain::reservation::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Confirmed => Self::Confirmed,
            Status::Cancelled => Self::Cancelled,
            Status::Completed => Self::Completed,
        }
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};
    use service::domain;

    use crate::api::scalar;

    use super::Email;

    fn email(s: &str) -> Result<Email, String> {
        scalar::Via::<domain::reservation::Email>::from_input::<
            Email,
            DefaultScalarValue,
        >(&InputValue::scalar(s.to_owned()))
    }

    #[test]
    fn guest_email_must_be_present_and_valid() {
        assert!(email("").is_err());
        assert!(email("   ").is_err());
        assert!(email("budi").is_err());
        assert_eq!(
            email("Budi@Example.com").unwrap().to_string(),
            "Budi@Example.com",
        );
    }
}
