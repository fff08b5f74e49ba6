//! [`Reservation`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select};
use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read,
};

impl<S: Storage> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Memory<S>
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| s.reservations.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage>
    Database<Select<By<Option<Reservation>, reservation::BookingCode>>>
    for Memory<S>
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::BookingCode>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        self.with_state(|s| {
            s.reservations
                .values()
                .find(|r| r.booking_code == code)
                .cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage>
    Database<Select<By<Vec<Reservation>, read::reservation::Filter>>>
    for Memory<S>
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, read::reservation::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        self.with_state(|s| {
            let mut found = s
                .reservations
                .values()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect::<Vec<_>>();
            found.sort_by_key(|r| std::cmp::Reverse(r.created_at));
            if let Some(limit) = filter.limit {
                found.truncate(usize::from(limit));
            }
            found
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<Reservation>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            #[cfg(test)]
            if s.reject_reservations
                || s.rejected_reservation == Some(reservation.id)
            {
                return Err(tracerr::new!(database::memory::Error::Rejected));
            }
            _ = s.reservations.insert(reservation.id, reservation);
            Ok::<_, Traced<database::memory::Error>>(())
        })
        .await
        .map_err(tracerr::wrap!())?
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<S: Storage> Database<Lock<By<Reservation, reservation::Id>>>
    for Memory<S>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Reservation, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are exclusive already.
        Ok(())
    }
}
