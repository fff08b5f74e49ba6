//! [`Command`] for confirming a pending [`Reservation`].

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    infra::{database, Database},
    ErrorKind, Service,
};

use super::Command;

/// [`Command`] for confirming a pending [`Reservation`].
#[derive(Clone, Copy, Debug)]
pub struct ConfirmReservation {
    /// ID of the [`Reservation`] to be confirmed.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<ConfirmReservation> for Service<Db>
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
        cmd: ConfirmReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmReservation { reservation_id } = cmd;

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

        let next = reservation::Status::Confirmed;
        if !reservation.status.can_become(next) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from: reservation.status,
                to: next,
            }));
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

/// Error of [`ConfirmReservation`] [`Command`] execution.
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
    use crate::{
        command::{CancelReservation, CreateReservation},
        domain::{reservation, room_type::Units, Reservation},
        infra::{Database as _, Memory},
        test_support::{date, guest, room_type, service},
        Command as _, ErrorKind, Service,
    };

    use super::ConfirmReservation;

    async fn booked(units: Units) -> (Service<Memory>, Reservation) {
        let svc = service();
        let rt = room_type(units);
        svc.database()
            .execute(common::operations::Insert(rt.clone()))
            .await
            .unwrap();
        let r = svc
            .execute(CreateReservation {
                guest: guest(),
                room_type_id: rt.id,
                check_in: date("2030-08-01"),
                check_out: date("2030-08-03"),
                guests: 1,
                special_requests: None,
                promo_code: None,
            })
            .await
            .unwrap();
        (svc, r)
    }

    #[tokio::test]
    async fn confirms_pending() {
        let (svc, r) = booked(2).await;

        let confirmed = svc
            .execute(ConfirmReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();

        assert_eq!(confirmed.status, reservation::Status::Confirmed);
        let state = svc.database().snapshot().await;
        let stored = state.reservations().next().unwrap();
        assert_eq!(stored.status, reservation::Status::Confirmed);
    }

    #[tokio::test]
    async fn rejects_confirming_twice_or_cancelled() {
        let (svc, r) = booked(2).await;
        let confirm = ConfirmReservation {
            reservation_id: r.id,
        };

        _ = svc.execute(confirm).await.unwrap();
        let err = svc.execute(confirm).await.unwrap_err();
        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);

        _ = svc
            .execute(CancelReservation {
                reservation_id: r.id,
            })
            .await
            .unwrap();
        let err = svc.execute(confirm).await.unwrap_err();
        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn rejects_unknown() {
        let svc = service();

        let err = svc
            .execute(ConfirmReservation {
                reservation_id: reservation::Id::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::NotFound);
    }
}
