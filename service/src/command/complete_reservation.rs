//! [`Command`] for completing a confirmed [`Reservation`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    infra::{database, Database},
    ErrorKind, Service,
};

use super::Command;

/// [`Command`] for completing a confirmed [`Reservation`] whose check-out
/// [`Date`] has come.
#[derive(Clone, Copy, Debug)]
pub struct CompleteReservation {
    /// ID of the [`Reservation`] to be completed.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<CompleteReservation> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Reservation, reservation::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteReservation { reservation_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

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

        let next = reservation::Status::Completed;
        if !reservation.status.can_become(next) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from: reservation.status,
                to: next,
            }));
        }
        let check_out = reservation.stay.check_out();
        if check_out > Date::today() {
            return Err(tracerr::new!(E::StayNotOver(check_out)));
        }
        reservation.status = next;

        tx.execute(Insert(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reservation)
    }
}

/// Error of [`CompleteReservation`] [`Command`] execution.
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

    /// Check-out [`Date`] of the [`Reservation`] has not come yet.
    #[display("Stay is not over until {_0}")]
    #[from(ignore)]
    StayNotOver(#[error(not(source))] Date),
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) => ErrorKind::PersistenceFailure,
            Self::InvalidStatusTransition { .. } | Self::StayNotOver(_) => {
                ErrorKind::InvalidInput
            }
            Self::ReservationNotExists(_) => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::{ConfirmReservation, CreateReservation},
        domain::{reservation, room_type, Reservation},
        infra::{Database as _, Memory},
        test_support::{date, guest, room_type, service},
        Command as _, ErrorKind, Service,
    };

    use super::CompleteReservation;

    async fn booked(
        svc: &Service<Memory>,
        room_type_id: room_type::Id,
        check_in: &str,
        check_out: &str,
    ) -> Reservation {
        svc.execute(CreateReservation {
            guest: guest(),
            room_type_id,
            check_in: date(check_in),
            check_out: date(check_out),
            guests: 1,
            special_requests: None,
            promo_code: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn completes_confirmed_past_stay() {
        let svc = service();
        let rt = room_type(1);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let r = booked(&svc, rt.id, "2020-05-01", "2020-05-03").await;
        _ = svc
            .execute(ConfirmReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        let completed = svc
            .execute(CompleteReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        assert_eq!(completed.status, reservation::Status::Completed);
        let state = svc.database().snapshot().await;
        let rec = state.record(rt.id, date("2020-05-01")).unwrap();
        assert_eq!(rec.sold_units, 1);
    }

    #[tokio::test]
    async fn rejects_pending() {
        let svc = service();
        let rt = room_type(1);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let r = booked(&svc, rt.id, "2020-05-01", "2020-05-03").await;

        let err = svc
            .execute(CompleteReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn rejects_future_stay() {
        let svc = service();
        let rt = room_type(1);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let r = booked(&svc, rt.id, "2099-05-01", "2099-05-03").await;
        _ = svc
            .execute(ConfirmReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        let err = svc
            .execute(CompleteReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
    }
}
