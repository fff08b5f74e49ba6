//! [`Command`] for cancelling a [`Reservation`].

use common::operations::{
    By, Commit, Insert, Lock, Release, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{inventory, reservation, Reservation},
    infra::{database, Database},
    ErrorKind, Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Reservation`], returning its nights to the
/// inventory.
///
/// Promo code usage is not restored.
#[derive(Clone, Copy, Debug)]
pub struct CancelReservation {
    /// ID of the [`Reservation`] to be cancelled.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<CancelReservation> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Reservation, reservation::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<
            Release<inventory::Hold>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelReservation { reservation_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid releasing the same nights twice.
        tx.execute(Lock(By::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;

        let next = reservation::Status::Cancelled;
        if !reservation.status.can_become(next) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from: reservation.status,
                to: next,
            }));
        }

        tx.execute(Release(reservation.hold()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        reservation.status = next;
        tx.execute(Insert(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Reservation(id: {}, booking_code: {})` cancelled, {} released",
            reservation.id,
            reservation.booking_code,
            reservation.stay,
        );

        Ok(reservation)
    }
}

/// Error of [`CancelReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Reservation`] cannot move into the requested status.
    #[display("Cannot change `Reservation` status from `{from}` to `{to}`")]
    #[from(ignore)]
    InvalidStatusTransition {
        /// Current [`reservation::Status`].
        from: reservation::Status,

        /// Requested [`reservation::Status`].
        to: reservation::Status,
    },

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    #[from(ignore)]
    ReservationNotExists(#[error(not(source))] reservation::Id),
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) => ErrorKind::PersistenceFailure,
            Self::InvalidStatusTransition { .. } => ErrorKind::InvalidInput,
            Self::ReservationNotExists(_) => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::{ConfirmReservation, CreateReservation},
        domain::{reservation, room_type},
        infra::Database as _,
        test_support::{date, guest, room_type, service},
        Command as _, ErrorKind,
    };

    use super::CancelReservation;

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
            guests: 1,
            special_requests: None,
            promo_code: None,
        }
    }

    #[tokio::test]
    async fn restores_sold_units_of_exact_range() {
        let svc = service();
        let rt = room_type(3);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        _ = svc
            .execute(booking(rt.id, "2030-09-01", "2030-09-05"))
            .await
            .unwrap();
        let r = svc
            .execute(booking(rt.id, "2030-09-02", "2030-09-04"))
            .await
            .unwrap();

        let cancelled = svc
            .execute(CancelReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        assert_eq!(cancelled.status, reservation::Status::Cancelled);
        let state = svc.database().snapshot().await;
        for night in ["2030-09-01", "2030-09-02", "2030-09-03", "2030-09-04"] {
            let rec = state.record(rt.id, date(night)).unwrap();
            assert_eq!(rec.sold_units, 1, "night {night}");
        }
    }

    #[tokio::test]
    async fn cancelled_unit_can_be_booked_again() {
        let svc = service();
        let rt = room_type(1);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let r = svc
            .execute(booking(rt.id, "2030-09-10", "2030-09-12"))
            .await
            .unwrap();
        _ = svc
            .execute(ConfirmReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        _ = svc
            .execute(CancelReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        _ = svc
            .execute(booking(rt.id, "2030-09-10", "2030-09-12"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_cancelling_twice_without_double_release() {
        let svc = service();
        let rt = room_type(2);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let first = svc
            .execute(booking(rt.id, "2030-10-01", "2030-10-02"))
            .await
            .unwrap();
        _ = svc
            .execute(booking(rt.id, "2030-10-01", "2030-10-02"))
            .await
            .unwrap();
        let cancel = CancelReservation {
            reservation_id: first.id,
        };

        _ = svc.execute(cancel).await.unwrap();
        let err = svc.execute(cancel).await.unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
        let state = svc.database().snapshot().await;
        let rec = state.record(rt.id, date("2030-10-01")).unwrap();
        assert_eq!(rec.sold_units, 1);
    }

    #[tokio::test]
    async fn keeps_units_within_bounds_over_book_cancel_sequence() {
        let svc = service();
        let rt = room_type(2);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let ranges = [
            ("2030-11-01", "2030-11-04"),
            ("2030-11-02", "2030-11-03"),
            ("2030-11-01", "2030-11-02"),
            ("2030-11-03", "2030-11-05"),
        ];

        let mut booked = vec![];
        for (round, (ci, co)) in ranges.iter().cycle().take(12).enumerate() {
            if let Ok(r) = svc.execute(booking(rt.id, ci, co)).await {
                booked.push(r.id);
            }
            if round % 3 == 2 {
                if let Some(id) = booked.pop() {
                    _ = svc
                        .execute(CancelReservation { reservation_id: id })
                        .await
                        .unwrap();
                }
            }

            let state = svc.database().snapshot().await;
            for rec in state.records() {
                assert!(rec.sold_units <= rec.total_units);
            }
        }
    }

    #[tokio::test]
    async fn rejects_unknown() {
        let svc = service();

        let err = svc
            .execute(CancelReservation {
                reservation_id: reservation::Id::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::NotFound);
    }
}
