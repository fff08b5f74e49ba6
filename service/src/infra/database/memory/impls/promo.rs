//! [`PromoCode`]-related [`Database`] implementations.

use common::operations::{Acquire, By, Insert, Lock, Select};
use tracerr::Traced;

use crate::{
    domain::{promo, PromoCode},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
};

impl<S: Storage> Database<Select<By<Option<PromoCode>, promo::Code>>>
    for Memory<S>
{
    type Ok = Option<PromoCode>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PromoCode>, promo::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        self.with_state(|s| s.promo_codes.get(&code).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<PromoCode>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(promo): Insert<PromoCode>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            _ = s.promo_codes.insert(promo.code.clone(), promo);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Lock<By<PromoCode, promo::Code>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<PromoCode, promo::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are exclusive already.
        Ok(())
    }
}

impl<S: Storage> Database<Acquire<promo::Redemption>> for Memory<S> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Acquire(redemption): Acquire<promo::Redemption>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            match s.promo_codes.get_mut(&redemption.code) {
                Some(p) if !p.is_exhausted() => {
                    p.current_usage += 1;
                    true
                }
                Some(_) | None => false,
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
