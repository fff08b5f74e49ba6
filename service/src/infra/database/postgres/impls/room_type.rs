//! [`RoomType`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{room_type, RoomType},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `room_types` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, name, \
    base_price, base_price_currency, \
    total_units, is_active, \
    created_at";

/// Builds a [`RoomType`] out of the provided `room_types` table [`Row`].
fn from_row(row: &Row) -> RoomType {
    RoomType {
        id: row.get("id"),
        name: row.get("name"),
        base_price: Money {
            amount: row.get("base_price"),
            currency: row.get("base_price_currency"),
        },
        total_units: room_type::Units::try_from(
            row.get::<_, i32>("total_units"),
        )
        .expect("`total_units` overflow"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<RoomType>, room_type::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<RoomType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RoomType>, room_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room_type::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM room_types \
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

impl<C> Database<Select<By<Vec<RoomType>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RoomType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<RoomType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM room_types \
             ORDER BY created_at ASC, id ASC",
        );
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<RoomType>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room_type): Insert<RoomType>,
    ) -> Result<Self::Ok, Self::Err> {
        let RoomType {
            id,
            name,
            base_price,
            total_units,
            is_active,
            created_at,
        } = room_type;

        let total_units = i32::from(total_units);

        const SQL: &str = "\
            INSERT INTO room_types (\
                id, name, \
                base_price, base_price_currency, \
                total_units, is_active, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::NUMERIC, $4::INT2, \
                $5::INT4, $6::BOOLEAN, \
                $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                base_price = EXCLUDED.base_price, \
                base_price_currency = EXCLUDED.base_price_currency, \
                total_units = EXCLUDED.total_units, \
                is_active = EXCLUDED.is_active";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &base_price.amount,
                &base_price.currency,
                &total_units,
                &is_active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
