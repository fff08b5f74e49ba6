//! Inventory ledger [`Database`] implementations.

use common::{
    money::Currency,
    operations::{Acquire, By, Lock, Release, Select, Update},
    Date, Money,
};
use postgres_types::ToSql;
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{inventory, room_type},
    infra::{
        database::{
            self,
            postgres::{Connection, Tx},
            Postgres,
        },
        Database,
    },
};

/// Columns of the `inventory` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    room_type_id, date, \
    total_units, sold_units, \
    rate, rate_currency, \
    is_closed";

/// Builds an [`inventory::Record`] out of the provided `inventory` table
/// [`Row`].
fn from_row(row: &Row) -> inventory::Record {
    inventory::Record {
        room_type_id: row.get("room_type_id"),
        date: row.get("date"),
        total_units: room_type::Units::try_from(
            row.get::<_, i32>("total_units"),
        )
        .expect("`total_units` overflow"),
        sold_units: room_type::Units::try_from(
            row.get::<_, i32>("sold_units"),
        )
        .expect("`sold_units` overflow"),
        rate: row
            .get::<_, Option<Decimal>>("rate")
            .zip(row.get::<_, Option<Currency>>("rate_currency"))
            .map(|(amount, currency)| Money { amount, currency }),
        is_closed: row.get("is_closed"),
    }
}

/// Builds SQL selecting [`COLUMNS`] of the `inventory` rows matching the
/// [`inventory::Selector`], with the `suffix` appended.
///
/// Parameters of the [`inventory::Selector`] are pushed to `ps`.
fn select_sql<'p>(
    selector: &'p inventory::Selector,
    from: &'p Date,
    to: &'p Date,
    ps: &mut Vec<&'p (dyn ToSql + Sync)>,
    suffix: &str,
) -> String {
    ps.push(from);
    ps.push(to);
    let room_type_idx = selector.room_type_id.as_ref().map(|id| {
        ps.push(id);
        ps.len()
    });

    format!(
        "SELECT {COLUMNS} \
         FROM inventory \
         WHERE date >= $1::DATE \
           AND date < $2::DATE \
               {room_type_filtering} \
         ORDER BY room_type_id ASC, date ASC \
         {suffix}",
        room_type_filtering = room_type_idx
            .map(|i| format!("AND room_type_id = ${i}::UUID"))
            .unwrap_or_default(),
    )
}

impl<C> Database<Select<By<Vec<inventory::Record>, inventory::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<inventory::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<inventory::Record>, inventory::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let (from, to) =
            (selector.dates.check_in(), selector.dates.check_out());

        let mut ps = Vec::new();
        let sql = select_sql(&selector, &from, &to, &mut ps, "");
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Lock<By<Vec<inventory::Record>, inventory::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<inventory::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vec<inventory::Record>, inventory::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let (from, last, to) = (
            selector.dates.check_in(),
            selector.dates.last_night(),
            selector.dates.check_out(),
        );

        // Rows must exist to be locked, so concurrent holds can't sneak in
        // on nights without a row yet.
        if let Some(id) = selector.room_type_id {
            self.exec(MATERIALIZE_SQL, &[&id, &from, &last])
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        let mut ps = Vec::new();
        let sql = select_sql(&selector, &from, &to, &mut ps, "FOR UPDATE");
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

/// SQL inserting default `inventory` rows of the `$1` room type for the nights
/// from `$2` to `$3` inclusive, if they don't exist yet.
const MATERIALIZE_SQL: &str = "\
    INSERT INTO inventory (room_type_id, date, total_units, sold_units) \
    SELECT rt.id, d::DATE, rt.total_units, 0 \
    FROM room_types AS rt, \
         generate_series($2::DATE::TIMESTAMP, \
                         $3::DATE::TIMESTAMP, \
                         INTERVAL '1 day') AS d \
    WHERE rt.id = $1::UUID \
    ON CONFLICT (room_type_id, date) DO NOTHING";

impl Database<Acquire<inventory::Hold>> for Postgres<Tx> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Acquire(hold): Acquire<inventory::Hold>,
    ) -> Result<Self::Ok, Self::Err> {
        let inventory::Hold { room_type_id, stay } = hold;
        let (from, last, to) =
            (stay.check_in(), stay.last_night(), stay.check_out());
        let nights = stay.num_nights();

        self.exec(MATERIALIZE_SQL, &[&room_type_id, &from, &last])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // Locking in the order of dates keeps overlapping holds from
        // deadlocking each other.
        const LOCK_SQL: &str = "\
            SELECT sold_units < total_units AND NOT is_closed \
                   AS has_free_unit \
            FROM inventory \
            WHERE room_type_id = $1::UUID \
              AND date >= $2::DATE \
              AND date < $3::DATE \
            ORDER BY date ASC \
            FOR UPDATE";
        let rows = self
            .query(LOCK_SQL, &[&room_type_id, &from, &to])
            .await
            .map_err(tracerr::wrap!())?;
        if u32::try_from(rows.len()).ok() != Some(nights)
            || !rows.iter().all(|r| r.get::<_, bool>("has_free_unit"))
        {
            return Ok(false);
        }

        const SQL: &str = "\
            UPDATE inventory \
            SET sold_units = sold_units + 1 \
            WHERE room_type_id = $1::UUID \
              AND date >= $2::DATE \
              AND date < $3::DATE \
              AND sold_units < total_units \
              AND NOT is_closed";
        let updated = self
            .exec(SQL, &[&room_type_id, &from, &to])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(updated == u64::from(nights))
    }
}

impl<C> Database<Release<inventory::Hold>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Release(hold): Release<inventory::Hold>,
    ) -> Result<Self::Ok, Self::Err> {
        let inventory::Hold { room_type_id, stay } = hold;
        let (from, to) = (stay.check_in(), stay.check_out());

        const SQL: &str = "\
            UPDATE inventory \
            SET sold_units = sold_units - 1 \
            WHERE room_type_id = $1::UUID \
              AND date >= $2::DATE \
              AND date < $3::DATE \
              AND sold_units > 0";
        self.exec(SQL, &[&room_type_id, &from, &to])
            .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<inventory::Allotment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(allotment): Update<inventory::Allotment>,
    ) -> Result<Self::Ok, Self::Err> {
        let inventory::Allotment {
            room_type_id,
            dates,
            total_units,
            rate,
            is_closed,
        } = allotment;
        let (from, last) = (dates.check_in(), dates.last_night());
        let total_units = total_units.map(i32::from);
        let (amount, currency) =
            (rate.map(|r| r.amount), rate.map(|r| r.currency));

        // `NULL` parameters keep the current values. Going below
        // `sold_units` violates `inventory_sold_units_check`.
        const SQL: &str = "\
            INSERT INTO inventory (room_type_id, date, \
                                   total_units, sold_units, \
                                   rate, rate_currency, \
                                   is_closed) \
            SELECT rt.id, d::DATE, \
                   COALESCE($4::INT4, rt.total_units), 0, \
                   $5::NUMERIC, $6::INT2, \
                   COALESCE($7::BOOLEAN, FALSE) \
            FROM room_types AS rt, \
                 generate_series($2::DATE::TIMESTAMP, \
                                 $3::DATE::TIMESTAMP, \
                                 INTERVAL '1 day') AS d \
            WHERE rt.id = $1::UUID \
            ON CONFLICT (room_type_id, date) DO UPDATE \
            SET total_units = COALESCE($4::INT4, inventory.total_units), \
                rate = COALESCE($5::NUMERIC, inventory.rate), \
                rate_currency = COALESCE($6::INT2, inventory.rate_currency), \
                is_closed = COALESCE($7::BOOLEAN, inventory.is_closed)";
        self.exec(
            SQL,
            &[
                &room_type_id,
                &from,
                &last,
                &total_units,
                &amount,
                &currency,
                &is_closed,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
