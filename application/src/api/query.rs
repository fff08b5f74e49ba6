//! GraphQL [`Query`]s definitions.

use common::{Date, Stay};
use juniper::graphql_object;
use service::{domain::inventory, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Lists the active `RoomType`s having at least one unit free on every
    /// night from `checkIn` until `checkOut` (exclusive), priced for the stay.
    ///
    /// Unknown `promoCode`, or one not discounting every night of the stay,
    /// leaves the prices undiscounted.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_STAY` - `checkOut` is not later than `checkIn`;
    /// - `PRICE_OVERFLOW` - some stay price is too large.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "searchAvailability",
            otel.name = Self::SPAN_NAME,
            promo_code = ?promo_code.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn search_availability(
        check_in: Date,
        check_out: Date,
        promo_code: Option<api::promo::Code>,
        ctx: &Context,
    ) -> Result<Vec<api::Offer>, Error> {
        ctx.service()
            .execute(query::SearchAvailability {
                check_in,
                check_out,
                promo_code: promo_code.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|offers| offers.into_iter().map(Into::into).collect())
    }

    /// Lists the `RoomType`s of the hotel.
    ///
    /// Inactive ones are listed only to the administration.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED`, `INVALID_TOKEN` - `includeInactive` is
    ///   requested without administrative access.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "roomTypes",
            include_inactive = include_inactive,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn room_types(
        #[graphql(default = false)] include_inactive: bool,
        ctx: &Context,
    ) -> Result<Vec<api::RoomType>, Error> {
        if include_inactive {
            ctx.require_admin().await?;
        }

        Ok(ctx
            .service()
            .execute(query::room_types::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .into_iter()
            .filter(|rt| include_inactive || rt.is_active)
            .map(Into::into)
            .collect())
    }

    /// Returns the `RoomType` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROOM_TYPE_NOT_EXISTS` - the `RoomType` with the specified ID does
    ///   not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "roomType",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn room_type(
        id: api::room_type::Id,
        ctx: &Context,
    ) -> Result<api::RoomType, Error> {
        ctx.service()
            .execute(query::room_type::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::RoomTypeError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Reservation` with the specified `BookingCode`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - no `Reservation` has the specified
    ///   `BookingCode`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_code = %booking_code,
            gql.name = "reservationByBookingCode",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservation_by_booking_code(
        booking_code: api::reservation::BookingCode,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(query::reservation::ByBookingCode::by(
                booking_code.into(),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Reservation` with the specified ID.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///   does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.require_admin().await?;

        ctx.service()
            .execute(query::reservation::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the `Reservation`s made for the specified guest email
    /// (case-insensitive), most recent first.
    ///
    /// Lets guests look their bookings up without a `BookingCode`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservationsByEmail",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservations_by_email(
        email: api::reservation::Email,
        ctx: &Context,
    ) -> Result<Vec<api::Reservation>, Error> {
        ctx.service()
            .execute(query::reservations::List::by(
                read::reservation::Filter {
                    guest_email: Some(email.into()),
                    ..read::reservation::Filter::default()
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Summarizes the hotel state on the specified `date`, or today if
    /// omitted.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DATE_OUT_OF_RANGE` - `date` is too close to the supported range
    ///   bounds.
    #[tracing::instrument(
        skip_all,
        fields(
            date = ?date.map(|d| d.to_string()),
            gql.name = "dashboard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn dashboard(
        date: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Dashboard, Error> {
        ctx.require_admin().await?;

        ctx.service()
            .execute(query::ViewDashboard {
                date: date.unwrap_or_else(Date::today),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists `Reservation`s, most recent first, optionally filtered by the
    /// guest email (case-insensitive) and the status.
    ///
    /// Requires administrative access.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservations",
            guest_email = ?guest_email.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn reservations(
        guest_email: Option<api::reservation::Email>,
        status: Option<api::reservation::Status>,
        ctx: &Context,
    ) -> Result<Vec<api::Reservation>, Error> {
        ctx.require_admin().await?;

        ctx.service()
            .execute(query::reservations::List::by(
                read::reservation::Filter {
                    guest_email: guest_email.map(Into::into),
                    status: status.map(Into::into),
                    ..read::reservation::Filter::default()
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Lists the `InventoryRecord`s of the nights from `startDate` until
    /// `endDate` (both inclusive), optionally of a single `RoomType`.
    ///
    /// Nights nothing was sold or adjusted on are omitted, meaning the whole
    /// default inventory of the `RoomType` is available.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `endDate` is earlier than `startDate`.
    #[tracing::instrument(
        skip_all,
        fields(
            end_date = %end_date,
            gql.name = "inventory",
            otel.name = Self::SPAN_NAME,
            room_type_id = ?room_type_id.map(|id| id.to_string()),
            start_date = %start_date,
        ),
    )]
    pub async fn inventory(
        start_date: Date,
        end_date: Date,
        room_type_id: Option<api::room_type::Id>,
        ctx: &Context,
    ) -> Result<Vec<api::InventoryRecord>, Error> {
        ctx.require_admin().await?;

        let dates = end_date
            .next()
            .and_then(|after_end| Stay::new(start_date, after_end))
            .ok_or_else(|| api::DateRangeError::Invalid.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::inventory::List::by(inventory::Selector {
                room_type_id: room_type_id.map(Into::into),
                dates,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|records| records.into_iter().map(Into::into).collect())
    }

    /// Returns the `PromoCode` with the specified code.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROMO_CODE_NOT_EXISTS` - the `PromoCode` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            code = %code,
            gql.name = "promoCode",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn promo_code(
        code: api::promo::Code,
        ctx: &Context,
    ) -> Result<api::PromoCode, Error> {
        ctx.require_admin().await?;

        ctx.service()
            .execute(query::promo_code::ByCode::by(code.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::PromoError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for query::search_availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidStay { .. } => Some(api::StayError::Invalid.into()),
            Self::PriceOverflow(_) => Some(api::PriceError::Overflow.into()),
        }
    }
}

impl AsError for query::dashboard::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DATE_OUT_OF_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`date` is out of the supported range"]
                DateOutOfRange,
            }
        }

        match self {
            Self::DateOutOfRange(_) => Some(Error::DateOutOfRange.into()),
            Self::Db(e) => e.try_as_error(),
            Self::RevenueOverflow => None,
        }
    }
}
