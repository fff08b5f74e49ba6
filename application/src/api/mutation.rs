//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::graphql_object;
use service::{
    command,
    domain::{promo, reservation},
    query, Command as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Books one unit of the `RoomType` for every night from `checkIn` until
    /// `checkOut` (exclusive).
    ///
    /// The created `Reservation` is `PENDING` until confirmed by the hotel.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_STAY` - `checkOut` is not later than `checkIn`;
    /// - `NO_GUESTS` - `guests` is zero;
    /// - `COUNT_OUT_OF_RANGE` - `guests` is negative or too large;
    /// - `ROOM_TYPE_NOT_EXISTS` - the `RoomType` does not exist or cannot be
    ///   booked;
    /// - `PROMO_CODE_NOT_EXISTS` - the `promoCode` does not exist;
    /// - `PROMO_CODE_NOT_APPLICABLE` - the `promoCode` cannot be redeemed
    ///   today, or doesn't discount every night of the stay;
    /// - `PRICE_OVERFLOW` - the stay price is too large;
    /// - `SOLD_OUT` - the `RoomType` has no free unit on some of the nights.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "createReservation",
            guest_email = %guest_email,
            otel.name = Self::SPAN_NAME,
            promo_code = ?promo_code.as_ref().map(ToString::to_string),
            room_type_id = %room_type_id,
        ),
    )]
    pub async fn create_reservation(
        room_type_id: api::room_type::Id,
        check_in: Date,
        check_out: Date,
        guests: api::Count,
        guest_name: api::reservation::GuestName,
        guest_email: api::reservation::Email,
        guest_phone: api::reservation::Phone,
        special_requests: Option<api::reservation::SpecialRequests>,
        promo_code: Option<api::promo::Code>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let guests = guests.fit().map_err(Error::from).map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateReservation {
                guest: reservation::Guest {
                    name: guest_name.into(),
                    email: guest_email.into(),
                    phone: guest_phone.into(),
                },
                room_type_id: room_type_id.into(),
                check_in,
                check_out,
                guests,
                special_requests: special_requests.map(Into::into),
                promo_code: promo_code.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Reservation` with the specified `BookingCode`, releasing
    /// its room for the booked nights.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - no `Reservation` has the specified
    ///   `BookingCode`;
    /// - `INVALID_STATUS_TRANSITION` - the `Reservation` is cancelled or
    ///   completed already.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_code = %booking_code,
            gql.name = "cancelReservation",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_reservation(
        booking_code: api::reservation::BookingCode,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let reservation = ctx
            .service()
            .execute(query::reservation::ByBookingCode::by(
                booking_code.into(),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ReservationError::NotExists.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CancelReservation {
                reservation_id: reservation.id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Confirms the `PENDING` `Reservation` with the specified ID.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` does not exist;
    /// - `INVALID_STATUS_TRANSITION` - the `Reservation` is not `PENDING`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "confirmReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn confirm_reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.require_admin().await?;

        ctx.service()
            .execute(command::ConfirmReservation {
                reservation_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Completes the `CONFIRMED` `Reservation` with the specified ID, whose
    /// stay is over.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` does not exist;
    /// - `INVALID_STATUS_TRANSITION` - the `Reservation` is not `CONFIRMED`;
    /// - `STAY_NOT_OVER` - the check-out date hasn't come yet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "completeReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn complete_reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.require_admin().await?;

        ctx.service()
            .execute(command::CompleteReservation {
                reservation_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `RoomType`.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PRICE` - `basePrice` is negative, fractional or too large;
    /// - `COUNT_OUT_OF_RANGE` - `totalUnits` is negative or too large.
    #[tracing::instrument(
        skip_all,
        fields(
            base_price = %base_price,
            gql.name = "createRoomType",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_room_type(
        name: api::room_type::Name,
        base_price: Money,
        total_units: api::Count,
        #[graphql(default = true)] is_active: bool,
        ctx: &Context,
    ) -> Result<api::RoomType, Error> {
        ctx.require_admin().await?;

        let total_units =
            total_units.fit().map_err(Error::from).map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateRoomType {
                name: name.into(),
                base_price,
                total_units,
                is_active,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `PromoCode`, valid from `validFrom` until `validUntil`
    /// (both inclusive).
    ///
    /// Empty `roomTypeIds` make the `PromoCode` valid for all `RoomType`s.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DISCOUNT` - `discountValue` is negative, exceeds 100 for
    ///   the `PERCENTAGE` kind, or is not a valid price for the
    ///   `FIXED_AMOUNT` kind;
    /// - `INVALID_VALIDITY_WINDOW` - `validUntil` is earlier than
    ///   `validFrom`;
    /// - `PROMO_CODE_EXISTS` - a `PromoCode` with the same code exists;
    /// - `ROOM_TYPE_NOT_EXISTS` - some of the `roomTypeIds` do not exist;
    /// - `COUNT_OUT_OF_RANGE` - `maxUsage` is negative.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            code = %code,
            discount_kind = ?discount_kind,
            discount_value = %discount_value,
            gql.name = "createPromoCode",
            otel.name = Self::SPAN_NAME,
            valid_from = %valid_from,
            valid_until = %valid_until,
        ),
    )]
    pub async fn create_promo_code(
        code: api::promo::Code,
        discount_kind: api::promo::DiscountKind,
        discount_value: api::promo::DiscountValue,
        max_usage: api::Count,
        #[graphql(default)] room_type_ids: Vec<api::room_type::Id>,
        valid_from: Date,
        valid_until: Date,
        #[graphql(default = true)] is_active: bool,
        ctx: &Context,
    ) -> Result<api::PromoCode, Error> {
        ctx.require_admin().await?;

        let discount =
            promo::Discount::new(discount_kind.into(), discount_value.into())
                .ok_or_else(|| DiscountError::Invalid.into())
                .map_err(ctx.error())?;
        let max_usage =
            max_usage.fit().map_err(Error::from).map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreatePromoCode {
                code: code.into(),
                discount,
                max_usage,
                room_type_ids: room_type_ids
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                valid_from,
                valid_until,
                is_active,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Changes the number of sellable units, the nightly rate or the sale
    /// status of the `RoomType` for every night from `startDate` until
    /// `endDate` (both inclusive).
    ///
    /// Omitted arguments keep their current values.
    ///
    /// Requires administrative access.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `endDate` is earlier than `startDate`;
    /// - `NOTHING_TO_UPDATE` - none of `totalUnits`, `rate` and `isClosed`
    ///   is provided;
    /// - `INVALID_RATE` - `rate` is not a valid price in the currency of the
    ///   `RoomType`;
    /// - `BELOW_SOLD_UNITS` - more units are sold on some night already;
    /// - `ROOM_TYPE_NOT_EXISTS` - the `RoomType` does not exist;
    /// - `COUNT_OUT_OF_RANGE` - `totalUnits` is negative or too large.
    #[tracing::instrument(
        skip_all,
        fields(
            end_date = %end_date,
            gql.name = "updateInventory",
            is_closed = ?is_closed,
            otel.name = Self::SPAN_NAME,
            rate = ?rate,
            room_type_id = %room_type_id,
            start_date = %start_date,
            total_units = ?total_units,
        ),
    )]
    pub async fn update_inventory(
        room_type_id: api::room_type::Id,
        start_date: Date,
        end_date: Date,
        total_units: Option<api::Count>,
        rate: Option<Money>,
        is_closed: Option<bool>,
        ctx: &Context,
    ) -> Result<Vec<api::InventoryRecord>, Error> {
        ctx.require_admin().await?;

        let total_units = total_units
            .map(api::Count::fit)
            .transpose()
            .map_err(Error::from)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateInventory {
                room_type_id: room_type_id.into(),
                start_date,
                end_date,
                total_units,
                rate,
                is_closed,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|records| records.into_iter().map(Into::into).collect())
    }
}

impl AsError for command::create_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_GUESTS"]
                #[status = BAD_REQUEST]
                #[message = "At least one guest is required"]
                NoGuests,

                #[code = "SOLD_OUT"]
                #[status = CONFLICT]
                #[message = "`RoomType` has no free unit on some of the \
                             requested nights"]
                SoldOut,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidStay { .. } => Some(api::StayError::Invalid.into()),
            Self::NoFreeBookingCode => None,
            Self::NoGuests => Some(Error::NoGuests.into()),
            Self::PriceOverflow(_) => Some(api::PriceError::Overflow.into()),
            Self::PromoNotApplicable(_) => {
                Some(api::PromoError::NotApplicable.into())
            }
            Self::PromoNotExists(_) => Some(api::PromoError::NotExists.into()),
            Self::RoomTypeNotExists(_) => {
                Some(api::RoomTypeError::NotExists.into())
            }
            Self::SoldOut { .. } => Some(Error::SoldOut.into()),
        }
    }
}

impl AsError for command::confirm_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidStatusTransition { .. } => {
                Some(api::ReservationError::InvalidStatusTransition.into())
            }
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::NotExists.into())
            }
        }
    }
}

impl AsError for command::cancel_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidStatusTransition { .. } => {
                Some(api::ReservationError::InvalidStatusTransition.into())
            }
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::NotExists.into())
            }
        }
    }
}

impl AsError for command::complete_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "STAY_NOT_OVER"]
                #[status = BAD_REQUEST]
                #[message = "Check-out date of the `Reservation` hasn't come \
                             yet"]
                StayNotOver,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidStatusTransition { .. } => {
                Some(api::ReservationError::InvalidStatusTransition.into())
            }
            Self::ReservationNotExists(_) => {
                Some(api::ReservationError::NotExists.into())
            }
            Self::StayNotOver(_) => Some(Error::StayNotOver.into()),
        }
    }
}

impl AsError for command::create_room_type::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidPrice(_) => Some(api::PriceError::Invalid.into()),
        }
    }
}

impl AsError for command::create_promo_code::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_VALIDITY_WINDOW"]
                #[status = BAD_REQUEST]
                #[message = "`validUntil` must not be earlier than \
                             `validFrom`"]
                InvalidWindow,

                #[code = "PROMO_CODE_EXISTS"]
                #[status = CONFLICT]
                #[message = "`PromoCode` with the same code exists already"]
                PromoCodeExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidWindow { .. } => Some(Error::InvalidWindow.into()),
            Self::PromoCodeExists(_) => Some(Error::PromoCodeExists.into()),
            Self::RoomTypeNotExists(_) => {
                Some(api::RoomTypeError::NotExists.into())
            }
        }
    }
}

impl AsError for command::update_inventory::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BELOW_SOLD_UNITS"]
                #[status = BAD_REQUEST]
                #[message = "More units are sold already on some of the \
                             nights"]
                BelowSold,

                #[code = "INVALID_RATE"]
                #[status = BAD_REQUEST]
                #[message = "`rate` must be a valid price in the currency of \
                             the `RoomType`"]
                InvalidRate,

                #[code = "NOTHING_TO_UPDATE"]
                #[status = BAD_REQUEST]
                #[message = "At least one of `totalUnits`, `rate` or \
                             `isClosed` is required"]
                NothingToUpdate,
            }
        }

        match self {
            Self::BelowSold { .. } => Some(Error::BelowSold.into()),
            Self::Db(e) => e.try_as_error(),
            Self::InvalidRange { .. } => {
                Some(api::DateRangeError::Invalid.into())
            }
            Self::InvalidRate(_) => Some(Error::InvalidRate.into()),
            Self::NothingToUpdate => Some(Error::NothingToUpdate.into()),
            Self::RoomTypeNotExists(_) => {
                Some(api::RoomTypeError::NotExists.into())
            }
        }
    }
}

define_error! {
    enum DiscountError {
        #[code = "INVALID_DISCOUNT"]
        #[status = BAD_REQUEST]
        #[message = "`discountValue` does not fit the `discountKind`"]
        Invalid,
    }
}
