//! [`Reservation`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select},
    Money, Stay,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::reservation::Filter,
};

/// Columns of the `reservations` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, booking_code, \
    guest_name, guest_email, guest_phone, \
    room_type_id, check_in, check_out, guests, \
    total_amount, total_amount_currency, \
    status, promo_code, special_requests, \
    created_at";

/// Builds a [`Reservation`] out of the provided `reservations` table [`Row`].
fn from_row(row: &Row) -> Reservation {
    Reservation {
        id: row.get("id"),
        booking_code: row.get("booking_code"),
        guest: reservation::Guest {
            name: row.get("guest_name"),
            email: row.get("guest_email"),
            phone: row.get("guest_phone"),
        },
        room_type_id: row.get("room_type_id"),
        stay: Stay::new(row.get("check_in"), row.get("check_out"))
            .expect("`check_out` is constrained to be later than `check_in`"),
        guests: u16::try_from(row.get::<_, i32>("guests"))
            .ok()
            .and_then(reservation::GuestCount::new)
            .expect("`guests` out of range"),
        total_amount: Money {
            amount: row.get("total_amount"),
            currency: row.get("total_amount_currency"),
        },
        status: row.get("status"),
        promo_code: row.get("promo_code"),
        special_requests: row.get("special_requests"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Reservation>, reservation::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reservation::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reservations \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<Reservation>, reservation::BookingCode>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reservation>, reservation::BookingCode>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reservations \
             WHERE booking_code = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&code])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Reservation>, Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Reservation>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Reservation>, Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Filter {
            guest_email,
            status,
            check_out_until,
            check_in_within,
            limit,
        } = by.into_inner();
        let check_in_within =
            check_in_within.map(|s| (s.check_in(), s.check_out()));
        let limit = limit.map(i64::from);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(email) = &guest_email {
            ps.push(email);
            conditions.push(format!(
                "LOWER(guest_email) = LOWER(${}::VARCHAR)",
                ps.len(),
            ));
        }
        if let Some(status) = &status {
            ps.push(status);
            conditions.push(format!("status = ${}::INT2", ps.len()));
        }
        if let Some(date) = &check_out_until {
            ps.push(date);
            conditions.push(format!("check_out <= ${}::DATE", ps.len()));
        }
        if let Some((from, to)) = &check_in_within {
            ps.push(from);
            ps.push(to);
            conditions.push(format!(
                "check_in >= ${}::DATE AND check_in < ${}::DATE",
                ps.len() - 1,
                ps.len(),
            ));
        }
        let limit_idx = limit.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reservations \
             {filtering} \
             ORDER BY created_at DESC, id DESC \
             {limiting}",
            filtering = if conditions.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", conditions.iter().join(" AND "))
            },
            limiting = limit_idx
                .map(|i| format!("LIMIT ${i}::INT8"))
                .unwrap_or_default(),
        );
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Reservation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reservation): Insert<Reservation>,
    ) -> Result<Self::Ok, Self::Err> {
        let Reservation {
            id,
            booking_code,
            guest,
            room_type_id,
            stay,
            guests,
            total_amount,
            status,
            promo_code,
            special_requests,
            created_at,
        } = reservation;

        let guests = i32::from(u16::from(guests));
        let (check_in, check_out) = (stay.check_in(), stay.check_out());

        const SQL: &str = "\
            INSERT INTO reservations (\
                id, booking_code, \
                guest_name, guest_email, guest_phone, \
                room_type_id, check_in, check_out, guests, \
                total_amount, total_amount_currency, \
                status, promo_code, special_requests, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::UUID, $7::DATE, $8::DATE, $9::INT4, \
                $10::NUMERIC, $11::INT2, \
                $12::INT2, $13::VARCHAR, $14::TEXT, \
                $15::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                special_requests = EXCLUDED.special_requests";
        self.exec(
            SQL,
            &[
                &id,
                &booking_code,
                &guest.name,
                &guest.email,
                &guest.phone,
                &room_type_id,
                &check_in,
                &check_out,
                &guests,
                &total_amount.amount,
                &total_amount.currency,
                &status,
                &promo_code,
                &special_requests,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Reservation, reservation::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Reservation, reservation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reservation::Id = by.into_inner();

        // Updating an existing row locks it until the end of transaction.
        const SQL: &str = "\
            INSERT INTO reservations_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
