//! [`CompletePastReservations`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Select, Start},
    Date,
};
use derive_more::{Display, Error as StdError, From};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{complete_reservation, CompleteReservation},
    domain::{reservation, Reservation},
    infra::{database, Database},
    read::reservation::Filter,
    Command, Service,
};

use super::Task;

/// Configuration for [`CompletePastReservations`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between checks for finished stays.
    pub interval: time::Duration,
}

/// [`Task`] completing confirmed [`Reservation`]s whose check-out [`Date`]
/// has come.
#[derive(Clone, Copy, Debug)]
pub struct CompletePastReservations<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<S> CompletePastReservations<S> {
    /// Creates a new [`CompletePastReservations`] [`Task`] over the provided
    /// [`Service`].
    #[must_use]
    pub fn new(config: Config, service: S) -> Self {
        Self { config, service }
    }
}

impl<Db> Task<Start<By<CompletePastReservations<Self>, Config>>> for Service<Db>
where
    CompletePastReservations<Service<Db>>:
        Task<Perform<()>, Ok = usize, Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CompletePastReservations<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let task = CompletePastReservations::new(by.into_inner(), self.clone());

        let mut interval = interval(task.config.interval);
        loop {
            _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::info!("{n} `Reservation`s completed"),
                Err(e) => {
                    log::error!("`task::CompletePastReservations` failed: {e}");
                }
            }
        }
    }
}

impl<Db> Task<Perform<()>> for CompletePastReservations<Service<Db>>
where
    Db: Database<
        Select<By<Vec<Reservation>, Filter>>,
        Ok = Vec<Reservation>,
        Err = Traced<database::Error>,
    >,
    Service<Db>: Command<
        CompleteReservation,
        Ok = Reservation,
        Err = Traced<complete_reservation::ExecutionError>,
    >,
{
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let due = self
            .service
            .database()
            .execute(Select(By::new(Filter {
                status: Some(reservation::Status::Confirmed),
                check_out_until: Some(Date::today()),
                ..Filter::default()
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;

        // A single failure must not hold back the rest of due `Reservation`s.
        let mut completed = 0;
        for r in due {
            match self
                .service
                .execute(CompleteReservation {
                    reservation_id: r.id,
                })
                .await
            {
                Ok(_) => completed += 1,
                Err(e) => log::warn!(
                    "failed to complete `Reservation(id: {})`, skipping: {e}",
                    r.id,
                ),
            }
        }
        Ok(completed)
    }
}

/// Error of [`CompletePastReservations`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::{Insert, Perform};

    use crate::{
        command::{ConfirmReservation, CreateReservation},
        domain::{reservation, room_type, Reservation},
        infra::{Database as _, Memory},
        test_support::{date, guest, room_type, service},
        Command as _, Service, Task as _,
    };

    use super::CompletePastReservations;

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
    async fn completes_only_confirmed_finished_stays() {
        let svc = service();
        let rt = room_type(5);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let past = booked(&svc, rt.id, "2021-03-01", "2021-03-04").await;
        let past_pending = booked(&svc, rt.id, "2021-03-01", "2021-03-04").await;
        let future = booked(&svc, rt.id, "2099-03-01", "2099-03-04").await;
        for id in [past.id, future.id] {
            _ = svc
                .execute(ConfirmReservation { reservation_id: id })
                .await
                .unwrap();
        }
        let task = CompletePastReservations::new(
            svc.config().complete_past_reservations,
            svc.clone(),
        );

        let completed = task.execute(Perform(())).await.unwrap();

        assert_eq!(completed, 1);
        let state = svc.database().snapshot().await;
        for r in state.reservations() {
            let expected = match r.id {
                id if id == past.id => reservation::Status::Completed,
                id if id == past_pending.id => reservation::Status::Pending,
                _ => reservation::Status::Confirmed,
            };
            assert_eq!(r.status, expected);
        }

        assert_eq!(task.execute(Perform(())).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_completion_does_not_stop_the_rest() {
        let svc = service();
        let rt = room_type(5);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let mut due = vec![];
        for _ in 0..3 {
            let r = booked(&svc, rt.id, "2021-03-01", "2021-03-04").await;
            _ = svc
                .execute(ConfirmReservation {
                    reservation_id: r.id,
                })
                .await
                .unwrap();
            due.push(r.id);
        }
        svc.database().reject_reservation(due[1]).await;
        let task = CompletePastReservations::new(
            svc.config().complete_past_reservations,
            svc.clone(),
        );

        let completed = task.execute(Perform(())).await.unwrap();

        assert_eq!(completed, 2);
        let state = svc.database().snapshot().await;
        for r in state.reservations() {
            let expected = if r.id == due[1] {
                reservation::Status::Confirmed
            } else {
                reservation::Status::Completed
            };
            assert_eq!(r.status, expected);
        }
    }
}
