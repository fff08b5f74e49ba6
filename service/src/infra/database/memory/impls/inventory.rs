//! Inventory ledger [`Database`] implementations.

use common::operations::{Acquire, By, Lock, Release, Select, Update};
use tracerr::Traced;

use crate::{
    domain::inventory,
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
};

impl<S: Storage>
    Database<Select<By<Vec<inventory::Record>, inventory::Selector>>>
    for Memory<S>
{
    type Ok = Vec<inventory::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<inventory::Record>, inventory::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        self.with_state(|s| {
            s.inventory
                .values()
                .filter(|r| selector.matches(r))
                .copied()
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage>
    Database<Lock<By<Vec<inventory::Record>, inventory::Selector>>>
    for Memory<S>
{
    type Ok = Vec<inventory::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vec<inventory::Record>, inventory::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions are exclusive already.
        self.execute(Select(by)).await
    }
}

impl<S: Storage> Database<Acquire<inventory::Hold>> for Memory<S> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Acquire(hold): Acquire<inventory::Hold>,
    ) -> Result<Self::Ok, Self::Err> {
        let inventory::Hold { room_type_id, stay } = hold;
        self.with_state(|s| {
            let Some(room_type) = s.room_types.get(&room_type_id) else {
                return false;
            };
            let records = stay
                .nights()
                .map(|night| {
                    s.inventory
                        .get(&(room_type_id, night))
                        .copied()
                        .unwrap_or_else(|| {
                            inventory::Record::vacant(room_type, night)
                        })
                })
                .collect::<Vec<_>>();
            if records.iter().any(|r| r.available_units() == 0) {
                return false;
            }
            for mut r in records {
                r.sold_units += 1;
                _ = s.inventory.insert((room_type_id, r.date), r);
            }
            true
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Release<inventory::Hold>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Release(hold): Release<inventory::Hold>,
    ) -> Result<Self::Ok, Self::Err> {
        let inventory::Hold { room_type_id, stay } = hold;
        self.with_state(|s| {
            for night in stay.nights() {
                if let Some(r) = s.inventory.get_mut(&(room_type_id, night)) {
                    r.sold_units = r.sold_units.saturating_sub(1);
                }
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<inventory::Allotment>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(allotment): Update<inventory::Allotment>,
    ) -> Result<Self::Ok, Self::Err> {
        let room_type_id = allotment.room_type_id;
        self.with_state(|s| {
            let Some(room_type) = s.room_types.get(&room_type_id) else {
                return;
            };
            for date in allotment.dates.nights() {
                let r = s
                    .inventory
                    .entry((room_type_id, date))
                    .or_insert_with(|| {
                        inventory::Record::vacant(room_type, date)
                    });
                allotment.apply_to(r);
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
