//! [`PromoCode`]-related [`Database`] implementations.

use common::operations::{Acquire, By, Insert, Lock, Select};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{promo, PromoCode},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<PromoCode>, promo::Code>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<PromoCode>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PromoCode>, promo::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();

        const SQL: &str = "\
            SELECT code, discount_kind, discount_value, \
                   max_usage, current_usage, room_type_ids, \
                   valid_from, valid_until, is_active, \
                   created_at \
            FROM promo_codes \
            WHERE code = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| PromoCode {
                code: row.get("code"),
                discount: promo::Discount::new(
                    row.get("discount_kind"),
                    row.get::<_, Decimal>("discount_value"),
                )
                .expect("`discount_value` out of range"),
                max_usage: promo::Usage::try_from(
                    row.get::<_, i64>("max_usage"),
                )
                .expect("`max_usage` overflow"),
                current_usage: promo::Usage::try_from(
                    row.get::<_, i64>("current_usage"),
                )
                .expect("`current_usage` overflow"),
                room_type_ids: row.get("room_type_ids"),
                valid_from: row.get("valid_from"),
                valid_until: row.get("valid_until"),
                is_active: row.get("is_active"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<PromoCode>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(promo): Insert<PromoCode>,
    ) -> Result<Self::Ok, Self::Err> {
        let PromoCode {
            code,
            discount,
            max_usage,
            current_usage,
            room_type_ids,
            valid_from,
            valid_until,
            is_active,
            created_at,
        } = promo;

        let (kind, value) = (discount.kind(), discount.value());
        let max_usage = i64::from(max_usage);
        let current_usage = i64::from(current_usage);

        const SQL: &str = "\
            INSERT INTO promo_codes (\
                code, discount_kind, discount_value, \
                max_usage, current_usage, room_type_ids, \
                valid_from, valid_until, is_active, \
                created_at \
            ) VALUES (\
                $1::VARCHAR, $2::INT2, $3::NUMERIC, \
                $4::INT8, $5::INT8, $6::UUID[], \
                $7::DATE, $8::DATE, $9::BOOLEAN, \
                $10::TIMESTAMPTZ \
            ) \
            ON CONFLICT (code) DO UPDATE \
            SET discount_kind = EXCLUDED.discount_kind, \
                discount_value = EXCLUDED.discount_value, \
                max_usage = EXCLUDED.max_usage, \
                current_usage = EXCLUDED.current_usage, \
                room_type_ids = EXCLUDED.room_type_ids, \
                valid_from = EXCLUDED.valid_from, \
                valid_until = EXCLUDED.valid_until, \
                is_active = EXCLUDED.is_active";
        self.exec(
            SQL,
            &[
                &code,
                &kind,
                &value,
                &max_usage,
                &current_usage,
                &room_type_ids,
                &valid_from,
                &valid_until,
                &is_active,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<PromoCode, promo::Code>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<PromoCode, promo::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();

        // Updating an existing row locks it until the end of transaction.
        const SQL: &str = "\
            INSERT INTO promo_codes_lock \
            VALUES ($1::VARCHAR) \
            ON CONFLICT (code) DO UPDATE \
            SET code = EXCLUDED.code";
        self.exec(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Acquire<promo::Redemption>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Acquire(redemption): Acquire<promo::Redemption>,
    ) -> Result<Self::Ok, Self::Err> {
        let promo::Redemption { code } = redemption;

        const SQL: &str = "\
            UPDATE promo_codes \
            SET current_usage = current_usage + 1 \
            WHERE code = $1::VARCHAR \
              AND current_usage < max_usage";
        self.exec(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())
            .map(|updated| updated == 1)
    }
}
