//! [`Query`] collection related to multiple [`Reservation`]s.

use common::operations::By;

use crate::{domain::Reservation, read::reservation::Filter};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries [`Reservation`]s matching a [`Filter`], most recent first.
pub type List = DatabaseQuery<By<Vec<Reservation>, Filter>>;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::CreateReservation,
        domain::reservation,
        infra::Database as _,
        read::reservation::Filter,
        test_support::{date, guest, room_type, service},
        Command as _, Query as _,
    };

    use super::List;

    #[tokio::test]
    async fn looks_reservations_up_by_guest_email() {
        let svc = service();
        let rt = room_type(5);
        svc.database().execute(Insert(rt.clone())).await.unwrap();
        let other = reservation::Guest {
            email: reservation::Email::new("sari@example.com").unwrap(),
            ..guest()
        };
        for (g, check_in, check_out) in [
            (guest(), "2030-01-10", "2030-01-12"),
            (other, "2030-01-10", "2030-01-11"),
            (guest(), "2030-02-01", "2030-02-02"),
        ] {
            _ = svc
                .execute(CreateReservation {
                    guest: g,
                    room_type_id: rt.id,
                    check_in: date(check_in),
                    check_out: date(check_out),
                    guests: 1,
                    special_requests: None,
                    promo_code: None,
                })
                .await
                .unwrap();
        }

        let found = svc
            .execute(List::by(Filter {
                guest_email: reservation::Email::new("BUDI@example.COM"),
                ..Filter::default()
            }))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .all(|r| r.guest.email.to_string() == "budi@example.com"));

        let limited = svc
            .execute(List::by(Filter {
                limit: Some(1),
                ..Filter::default()
            }))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
