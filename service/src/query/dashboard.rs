//! [`Query`] for summarizing the hotel state on the administration dashboard.

use common::{
    money::Currency,
    operations::{By, Select},
    Date, Money, Stay,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inventory, reservation, Reservation, RoomType},
    infra::{database, Database},
    read::{dashboard, reservation::Filter, Dashboard},
    ErrorKind, Service,
};

use super::Query;

/// [`Query`] for summarizing the hotel state on the provided [`Date`].
#[derive(Clone, Copy, Debug)]
pub struct ViewDashboard {
    /// [`Date`] to summarize.
    pub date: Date,
}

impl<Db> Query<ViewDashboard> for Service<Db>
where
    Db: Database<
            Select<By<Vec<RoomType>, ()>>,
            Ok = Vec<RoomType>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<inventory::Record>, inventory::Selector>>,
            Ok = Vec<inventory::Record>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Reservation>, Filter>>,
            Ok = Vec<Reservation>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Dashboard;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ViewDashboard,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ViewDashboard { date } = query;
        let (night, month) = Stay::night(date)
            .zip(Stay::month_of(date))
            .ok_or(E::DateOutOfRange(date))
            .map_err(tracerr::wrap!())?;

        let room_types = self
            .database()
            .execute(Select(By::<Vec<RoomType>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let records = self
            .database()
            .execute(Select(By::<Vec<inventory::Record>, _>::new(
                inventory::Selector {
                    room_type_id: None,
                    dates: night,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut paid = vec![];
        for status in
            [reservation::Status::Confirmed, reservation::Status::Completed]
        {
            paid.extend(
                self.database()
                    .execute(Select(By::new(Filter {
                        status: Some(status),
                        check_in_within: Some(month),
                        ..Filter::default()
                    })))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?,
            );
        }

        let recent_reservations = self
            .database()
            .execute(Select(By::new(Filter {
                limit: Some(dashboard::RECENT_RESERVATIONS),
                ..Filter::default()
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let active = room_types.iter().filter(|rt| rt.is_active);
        let (occupied_units, available_units) =
            active.fold((0, 0), |(occupied, available), rt| {
                let sold = inventory::record_of(rt.id, date, &records)
                    .map_or(0, |r| r.sold_units);
                let free = inventory::free_units(rt, night, &records);
                (occupied + u32::from(sold), available + u32::from(free))
            });

        Ok(Dashboard {
            date,
            occupied_units,
            available_units,
            monthly_revenue: revenue(&paid)
                .ok_or(E::RevenueOverflow)
                .map_err(tracerr::wrap!())?,
            total_room_types: u32::try_from(room_types.len())
                .unwrap_or(u32::MAX),
            recent_reservations,
        })
    }
}

/// Sums the total amounts of the provided [`Reservation`]s per [`Currency`].
///
/// Currencies without [`Reservation`]s are omitted. [`None`] is returned on
/// overflow.
fn revenue(reservations: &[Reservation]) -> Option<Vec<Money>> {
    Currency::ALL
        .iter()
        .copied()
        .filter(|c| reservations.iter().any(|r| r.total_amount.currency == *c))
        .map(|c| {
            Money::sum_in(
                c,
                reservations
                    .iter()
                    .map(|r| r.total_amount)
                    .filter(|m| m.currency == c),
            )
        })
        .collect()
}

/// Error of [`ViewDashboard`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Requested [`Date`] is too close to the supported range bounds.
    #[display("{_0} is out of the supported range")]
    #[from(ignore)]
    DateOutOfRange(#[error(not(source))] Date),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Monthly revenue doesn't fit.
    #[display("Monthly revenue overflows")]
    RevenueOverflow,
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DateOutOfRange(_) => ErrorKind::InvalidInput,
            Self::Db(_) | Self::RevenueOverflow => {
                ErrorKind::PersistenceFailure
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Date};

    use crate::{
        command::{
            CancelReservation, CompleteReservation, ConfirmReservation,
            CreateReservation, UpdateInventory,
        },
        domain::{room_type, RoomType},
        infra::{Database as _, Memory},
        test_support::{date, guest, idr, room_type, service},
        Command as _, Query as _, Service,
    };

    use super::ViewDashboard;

    async fn book(
        svc: &Service<Memory>,
        room_type_id: room_type::Id,
        check_in: Date,
        check_out: Date,
    ) -> crate::domain::Reservation {
        svc.execute(CreateReservation {
            guest: guest(),
            room_type_id,
            check_in,
            check_out,
            guests: 1,
            special_requests: None,
            promo_code: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn summarizes_occupancy_revenue_and_recent_bookings() {
        let svc = service();
        let rt = room_type(4);
        let closed = room_type(2);
        let inactive = RoomType {
            is_active: false,
            ..room_type(9)
        };
        for t in [&rt, &closed, &inactive] {
            svc.database().execute(Insert(t.clone())).await.unwrap();
        }
        _ = svc
            .execute(UpdateInventory {
                room_type_id: closed.id,
                start_date: date("2030-05-10"),
                end_date: date("2030-05-10"),
                total_units: None,
                rate: None,
                is_closed: Some(true),
            })
            .await
            .unwrap();

        let confirmed =
            book(&svc, rt.id, date("2030-05-09"), date("2030-05-11")).await;
        let completed =
            book(&svc, rt.id, date("2021-05-01"), date("2021-05-02")).await;
        let cancelled =
            book(&svc, rt.id, date("2030-05-10"), date("2030-05-12")).await;
        _ = book(&svc, rt.id, date("2030-05-20"), date("2030-05-21")).await;
        let next_month =
            book(&svc, rt.id, date("2030-06-01"), date("2030-06-02")).await;
        for id in [confirmed.id, completed.id, next_month.id] {
            _ = svc
                .execute(ConfirmReservation { reservation_id: id })
                .await
                .unwrap();
        }
        _ = svc
            .execute(CompleteReservation {
                reservation_id: completed.id,
            })
            .await
            .unwrap();
        _ = svc
            .execute(CancelReservation {
                reservation_id: cancelled.id,
            })
            .await
            .unwrap();
        _ = book(&svc, rt.id, date("2030-05-30"), date("2030-05-31")).await;

        let dashboard = svc
            .execute(ViewDashboard {
                date: date("2030-05-10"),
            })
            .await
            .unwrap();

        assert_eq!(dashboard.occupied_units, 1);
        assert_eq!(dashboard.available_units, 3);
        assert_eq!(dashboard.monthly_revenue, vec![idr(2_000_000)]);
        assert_eq!(dashboard.total_room_types, 3);
        assert_eq!(dashboard.recent_reservations.len(), 5);
        for pair in dashboard.recent_reservations.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let past = svc
            .execute(ViewDashboard {
                date: date("2021-05-15"),
            })
            .await
            .unwrap();
        assert_eq!(past.monthly_revenue, vec![idr(1_000_000)]);
    }

    #[tokio::test]
    async fn empty_hotel_has_nothing_to_show() {
        let svc = service();

        let dashboard = svc
            .execute(ViewDashboard {
                date: date("2030-05-10"),
            })
            .await
            .unwrap();

        assert_eq!(dashboard.occupied_units, 0);
        assert_eq!(dashboard.available_units, 0);
        assert!(dashboard.monthly_revenue.is_empty());
        assert_eq!(dashboard.total_room_types, 0);
        assert!(dashboard.recent_reservations.is_empty());
    }
}
