//! [`Command`] for admitting a new [`Reservation`].

use common::{
    operations::{
        Acquire, By, Commit, Insert, Rollback, Select, Transact, Transacted,
    },
    Date, DateTime, Stay,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        inventory, promo, reservation, room_type, PromoCode, Reservation,
        RoomType,
    },
    infra::{database, Database},
    pricing::{self, Quote},
    ErrorKind, Service,
};

use super::Command;

/// [`Command`] for admitting a new [`Reservation`].
#[derive(Clone, Debug)]
pub struct CreateReservation {
    /// [`reservation::Guest`] the new [`Reservation`] is made for.
    pub guest: reservation::Guest,

    /// ID of the [`RoomType`] to book.
    pub room_type_id: room_type::Id,

    /// First night to book.
    pub check_in: Date,

    /// Departure [`Date`], exclusive.
    pub check_out: Date,

    /// Number of people staying.
    pub guests: u16,

    /// [`reservation::SpecialRequests`] of the guest, if any.
    pub special_requests: Option<reservation::SpecialRequests>,

    /// [`promo::Code`] to apply, if any.
    pub promo_code: Option<promo::Code>,
}

impl<Db> Command<CreateReservation> for Service<Db>
where
    Db: Database<
            Select<By<Option<RoomType>, room_type::Id>>,
            Ok = Option<RoomType>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<PromoCode>, promo::Code>>,
            Ok = Option<PromoCode>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<inventory::Record>, inventory::Selector>>,
            Ok = Vec<inventory::Record>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Acquire<inventory::Hold>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Acquire<promo::Redemption>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::BookingCode>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>
        + Database<Rollback, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: CreateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReservation {
            guest,
            room_type_id,
            check_in,
            check_out,
            guests,
            special_requests,
            promo_code,
        } = cmd;

        let stay = Stay::new(check_in, check_out)
            .ok_or(E::InvalidStay {
                check_in,
                check_out,
            })
            .map_err(tracerr::wrap!())?;
        let guests = reservation::GuestCount::new(guests)
            .ok_or(E::NoGuests)
            .map_err(tracerr::wrap!())?;

        let room_type = self
            .database()
            .execute(Select(By::<Option<RoomType>, _>::new(room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|rt| rt.is_active)
            .ok_or(E::RoomTypeNotExists(room_type_id))
            .map_err(tracerr::wrap!())?;

        let promo = if let Some(code) = promo_code {
            let promo = self
                .database()
                .execute(Select(By::<Option<PromoCode>, _>::new(code.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::PromoNotExists(code.clone()))
                .map_err(tracerr::wrap!())?;
            if !promo.applies_to_stay(room_type.id, stay, Date::today()) {
                return Err(tracerr::new!(E::PromoNotApplicable(code)));
            }
            Some(promo)
        } else {
            None
        };

        let records = self
            .database()
            .execute(Select(By::<Vec<inventory::Record>, _>::new(
                inventory::Selector {
                    room_type_id: Some(room_type.id),
                    dates: stay,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if inventory::free_units(&room_type, stay, &records) == 0 {
            return Err(tracerr::new!(E::SoldOut {
                room_type_id,
                stay,
            }));
        }

        let quote = Quote::new(&room_type, stay, &records, promo.as_ref())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        // Dropping `tx` before `Commit` discards everything held below.
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let held = tx
            .execute(Acquire(inventory::Hold {
                room_type_id,
                stay,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !held {
            // Lost the race for the last unit to a concurrent booking.
            return Err(tracerr::new!(E::SoldOut {
                room_type_id,
                stay,
            }));
        }

        if let Some(p) = &promo {
            let redeemed = tx
                .execute(Acquire(promo::Redemption {
                    code: p.code.clone(),
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !redeemed {
                return Err(tracerr::new!(E::PromoNotApplicable(
                    p.code.clone()
                )));
            }
        }

        let mut booking_code = None;
        for _ in 0..self.config().booking_code_attempts {
            let code = reservation::BookingCode::generate();
            let taken = tx
                .execute(Select(By::<Option<Reservation>, _>::new(
                    code.clone(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some();
            if !taken {
                booking_code = Some(code);
                break;
            }
        }
        let booking_code = booking_code
            .ok_or(E::NoFreeBookingCode)
            .map_err(tracerr::wrap!())?;

        let reservation = Reservation {
            id: reservation::Id::new(),
            booking_code,
            guest,
            room_type_id,
            stay,
            guests,
            total_amount: quote.total,
            status: reservation::Status::Pending,
            promo_code: promo.map(|p| p.code),
            special_requests,
            created_at: DateTime::now().coerce(),
        };

        if let Err(e) = tx.execute(Insert(reservation.clone())).await {
            log::warn!(
                "failed to persist `Reservation(id: {})`, releasing hold of \
                 `RoomType(id: {room_type_id})` for {stay}: {e}",
                reservation.id,
            );
            _ = tx.execute(Rollback).await.map_err(|e| {
                log::error!("failed to release hold: {e}");
            });
            return Err(tracerr::map_from_and_wrap!(=> E)(e));
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Reservation(id: {}, booking_code: {})` admitted for \
             `RoomType(id: {room_type_id})` and {stay}",
            reservation.id,
            reservation.booking_code,
        );

        Ok(reservation)
    }
}

/// Error of [`CreateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested stay has no nights.
    #[display(
        "`check_out` ({check_out}) must be later than `check_in` ({check_in})"
    )]
    #[from(ignore)]
    InvalidStay {
        /// Requested first night.
        check_in: Date,

        /// Requested departure [`Date`].
        check_out: Date,
    },

    /// No unused [`reservation::BookingCode`] was generated.
    #[display("Failed to generate an unused `BookingCode`")]
    NoFreeBookingCode,

    /// Requested number of guests is zero.
    #[display("At least one guest is required")]
    NoGuests,

    /// Total price of the stay doesn't fit.
    #[display("Stay price overflows")]
    #[from]
    PriceOverflow(pricing::Overflow),

    /// [`PromoCode`] cannot be used for the requested [`Reservation`].
    #[display("`PromoCode(code: {_0})` is not applicable")]
    #[from(ignore)]
    PromoNotApplicable(#[error(not(source))] promo::Code),

    /// [`PromoCode`] with the provided code does not exist.
    #[display("`PromoCode(code: {_0})` does not exist")]
    #[from(ignore)]
    PromoNotExists(#[error(not(source))] promo::Code),

    /// Active [`RoomType`] with the provided ID does not exist.
    #[display("`RoomType(id: {_0})` does not exist")]
    #[from(ignore)]
    RoomTypeNotExists(#[error(not(source))] room_type::Id),

    /// [`RoomType`] has no unit free on every night of the stay.
    #[display("`RoomType(id: {room_type_id})` is sold out for {stay}")]
    #[from(ignore)]
    SoldOut {
        /// ID of the requested [`RoomType`].
        room_type_id: room_type::Id,

        /// Requested nights.
        stay: Stay,
    },
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) | Self::NoFreeBookingCode => {
                ErrorKind::PersistenceFailure
            }
            Self::InvalidStay { .. }
            | Self::NoGuests
            | Self::PriceOverflow(_) => ErrorKind::InvalidInput,
            Self::PromoNotApplicable(_) | Self::PromoNotExists(_) => {
                ErrorKind::InvalidPromo
            }
            Self::RoomTypeNotExists(_) => ErrorKind::NotFound,
            Self::SoldOut { .. } => ErrorKind::Unavailable,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;
    use futures::future;

    use crate::{
        domain::{promo, room_type, PromoCode, RoomType},
        infra::{Database as _, Memory},
        test_support::{date, guest, idr, promo, room_type, service},
        Command as _, ErrorKind, Service,
    };

    use super::CreateReservation;

    fn booking(
        room_type_id: room_type::Id,
        check_in: &str,
        check_out: &str,
    ) -> CreateReservation {
        CreateReservation {
            guest: guest(),
            room_type_id,
            check_in: date(check_in),
            check_out: date(check_out),
            guests: 2,
            special_requests: None,
            promo_code: None,
        }
    }

    async fn seeded(units: room_type::Units) -> (Service<Memory>, RoomType) {
        let svc = service();
        let rt = room_type(units);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        (svc, rt)
    }

    async fn seed_promo(svc: &Service<Memory>, promo: PromoCode) {
        svc.database().execute(Insert(promo)).await.unwrap();
    }

    #[tokio::test]
    async fn admits_pending_reservation() {
        let (svc, rt) = seeded(3).await;

        let r = svc
            .execute(booking(rt.id, "2030-01-18", "2030-01-20"))
            .await
            .unwrap();

        assert_eq!(r.status, crate::domain::reservation::Status::Pending);
        assert_eq!(r.total_amount, idr(2_000_000));
        assert_eq!(r.stay.num_nights(), 2);

        let state = svc.database().snapshot().await;
        for night in ["2030-01-18", "2030-01-19"] {
            let rec = state.record(rt.id, date(night)).unwrap();
            assert_eq!((rec.total_units, rec.sold_units), (3, 1));
        }
        assert!(state.record(rt.id, date("2030-01-20")).is_none());
        assert_eq!(state.reservations().count(), 1);
    }

    #[tokio::test]
    async fn applies_ten_percent_promo() {
        let (svc, rt) = seeded(3).await;
        seed_promo(&svc, promo("WINTER10", "10")).await;

        let r = svc
            .execute(CreateReservation {
                promo_code: promo::Code::new("winter10"),
                ..booking(rt.id, "2030-01-18", "2030-01-20")
            })
            .await
            .unwrap();

        assert_eq!(r.total_amount, idr(1_800_000));
        assert_eq!(r.promo_code, promo::Code::new("WINTER10"));

        let state = svc.database().snapshot().await;
        let code = promo::Code::new("WINTER10").unwrap();
        assert_eq!(state.promo_code(&code).unwrap().current_usage, 1);
    }

    #[tokio::test]
    async fn rejects_reversed_dates_without_side_effects() {
        let (svc, rt) = seeded(3).await;

        let err = svc
            .execute(booking(rt.id, "2025-01-20", "2025-01-18"))
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
        let state = svc.database().snapshot().await;
        assert_eq!(state.records().count(), 0);
        assert_eq!(state.reservations().count(), 0);
    }

    #[tokio::test]
    async fn rejects_zero_guests() {
        let (svc, rt) = seeded(3).await;

        let err = svc
            .execute(CreateReservation {
                guests: 0,
                ..booking(rt.id, "2030-01-18", "2030-01-20")
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn rejects_unknown_or_inactive_room_type() {
        let svc = service();
        let inactive = RoomType {
            is_active: false,
            ..room_type(3)
        };
        svc.database().execute(Insert(inactive.clone())).await.unwrap();

        for id in [room_type::Id::new(), inactive.id] {
            let err = svc
                .execute(booking(id, "2030-01-18", "2030-01-20"))
                .await
                .unwrap_err();
            assert_eq!(err.as_ref().kind(), ErrorKind::NotFound);
        }
    }

    #[tokio::test]
    async fn rejects_expired_promo_without_side_effects() {
        let (svc, rt) = seeded(3).await;
        seed_promo(
            &svc,
            PromoCode {
                valid_from: date("2020-01-01"),
                valid_until: date("2020-12-31"),
                ..promo("OLD2020", "10")
            },
        )
        .await;

        let err = svc
            .execute(CreateReservation {
                promo_code: promo::Code::new("OLD2020"),
                ..booking(rt.id, "2030-01-18", "2030-01-20")
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidPromo);
        let state = svc.database().snapshot().await;
        assert_eq!(state.records().count(), 0);
        assert_eq!(state.reservations().count(), 0);
    }

    #[tokio::test]
    async fn promo_must_cover_booking_day_and_every_night() {
        let (svc, rt) = seeded(3).await;
        // Redeemable today, but expires before the stay.
        seed_promo(
            &svc,
            PromoCode {
                valid_until: date("2030-01-18"),
                ..promo("ENDSSOON", "10")
            },
        )
        .await;
        // Covers the stay, but not redeemable yet.
        seed_promo(
            &svc,
            PromoCode {
                valid_from: date("2030-01-01"),
                valid_until: date("2030-01-31"),
                ..promo("JAN2030", "10")
            },
        )
        .await;

        for code in ["ENDSSOON", "JAN2030"] {
            let err = svc
                .execute(CreateReservation {
                    promo_code: promo::Code::new(code),
                    ..booking(rt.id, "2030-01-18", "2030-01-20")
                })
                .await
                .unwrap_err();
            assert_eq!(err.as_ref().kind(), ErrorKind::InvalidPromo);
        }

        let state = svc.database().snapshot().await;
        assert_eq!(state.records().count(), 0);
        assert_eq!(state.reservations().count(), 0);
        for code in ["ENDSSOON", "JAN2030"] {
            let code = promo::Code::new(code).unwrap();
            assert_eq!(state.promo_code(&code).unwrap().current_usage, 0);
        }

        let r = svc
            .execute(CreateReservation {
                promo_code: promo::Code::new("ENDSSOON"),
                ..booking(rt.id, "2030-01-17", "2030-01-19")
            })
            .await
            .unwrap();
        assert_eq!(r.total_amount, idr(1_800_000));
    }

    #[tokio::test]
    async fn single_use_promo_is_redeemed_once_under_concurrency() {
        let (svc, rt) = seeded(8).await;
        seed_promo(
            &svc,
            PromoCode {
                max_usage: 1,
                ..promo("ONCE", "10")
            },
        )
        .await;

        let results = future::join_all((0..8).map(|_| {
            svc.execute(CreateReservation {
                promo_code: promo::Code::new("ONCE"),
                ..booking(rt.id, "2030-08-01", "2030-08-03")
            })
        }))
        .await;

        let admitted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(admitted, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.as_ref().kind(), ErrorKind::InvalidPromo);
        }

        let state = svc.database().snapshot().await;
        let code = promo::Code::new("ONCE").unwrap();
        assert_eq!(state.promo_code(&code).unwrap().current_usage, 1);
        assert_eq!(state.reservations().count(), 1);
        for night in ["2030-08-01", "2030-08-02"] {
            let rec = state.record(rt.id, date(night)).unwrap();
            assert_eq!(rec.sold_units, 1);
        }
    }

    #[tokio::test]
    async fn rejects_unknown_and_foreign_promo() {
        let (svc, rt) = seeded(3).await;
        seed_promo(
            &svc,
            PromoCode {
                room_type_ids: vec![room_type::Id::new()],
                ..promo("SUITEONLY", "20")
            },
        )
        .await;

        for code in ["MISSING", "SUITEONLY"] {
            let err = svc
                .execute(CreateReservation {
                    promo_code: promo::Code::new(code),
                    ..booking(rt.id, "2030-01-18", "2030-01-20")
                })
                .await
                .unwrap_err();
            assert_eq!(err.as_ref().kind(), ErrorKind::InvalidPromo);
        }
    }

    #[tokio::test]
    async fn exhausted_promo_is_rejected() {
        let (svc, rt) = seeded(5).await;
        seed_promo(
            &svc,
            PromoCode {
                max_usage: 2,
                ..promo("TWICE", "10")
            },
        )
        .await;
        let with_promo = || CreateReservation {
            promo_code: promo::Code::new("TWICE"),
            ..booking(rt.id, "2030-05-01", "2030-05-02")
        };

        _ = svc.execute(with_promo()).await.unwrap();
        _ = svc.execute(with_promo()).await.unwrap();
        let err = svc.execute(with_promo()).await.unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidPromo);
        let state = svc.database().snapshot().await;
        let rec = state.record(rt.id, date("2030-05-01")).unwrap();
        assert_eq!(rec.sold_units, 2);
    }

    #[tokio::test]
    async fn rejects_sold_out_range() {
        let (svc, rt) = seeded(1).await;
        _ = svc
            .execute(booking(rt.id, "2030-02-02", "2030-02-03"))
            .await
            .unwrap();

        let err = svc
            .execute(booking(rt.id, "2030-02-01", "2030-02-04"))
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::Unavailable);
        let state = svc.database().snapshot().await;
        assert!(state.record(rt.id, date("2030-02-01")).is_none());
    }

    #[tokio::test]
    async fn back_to_back_stays_share_a_unit() {
        let (svc, rt) = seeded(1).await;

        _ = svc
            .execute(booking(rt.id, "2030-03-01", "2030-03-03"))
            .await
            .unwrap();
        _ = svc
            .execute(booking(rt.id, "2030-03-03", "2030-03-05"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn only_one_concurrent_booking_gets_the_last_unit() {
        let (svc, rt) = seeded(1).await;

        let results = future::join_all(
            (0..8).map(|_| svc.execute(booking(rt.id, "2030-04-10", "2030-04-12"))),
        )
        .await;

        let admitted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(admitted, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.as_ref().kind(), ErrorKind::Unavailable);
        }

        let state = svc.database().snapshot().await;
        for rec in state.records() {
            assert!(rec.sold_units <= rec.total_units);
        }
        assert_eq!(state.reservations().count(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_releases_the_hold() {
        let (svc, rt) = seeded(2).await;
        seed_promo(&svc, promo("SAVE15", "15")).await;
        svc.database().reject_reservations().await;

        let err = svc
            .execute(CreateReservation {
                promo_code: promo::Code::new("SAVE15"),
                ..booking(rt.id, "2030-06-01", "2030-06-03")
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::PersistenceFailure);
        let state = svc.database().snapshot().await;
        assert_eq!(state.records().count(), 0);
        assert_eq!(state.reservations().count(), 0);
        let code = promo::Code::new("SAVE15").unwrap();
        assert_eq!(state.promo_code(&code).unwrap().current_usage, 0);
    }

    #[tokio::test]
    async fn booking_codes_are_unique() {
        let (svc, rt) = seeded(20).await;
        let mut codes = std::collections::HashSet::new();

        for _ in 0..20 {
            let r = svc
                .execute(booking(rt.id, "2030-07-01", "2030-07-02"))
                .await
                .unwrap();
            assert!(codes.insert(r.booking_code));
        }
    }
}
