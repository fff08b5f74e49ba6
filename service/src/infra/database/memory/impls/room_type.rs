//! [`RoomType`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{room_type, RoomType},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
};

impl<S: Storage> Database<Select<By<Option<RoomType>, room_type::Id>>>
    for Memory<S>
{
    type Ok = Option<RoomType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RoomType>, room_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_state(|s| s.room_types.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Select<By<Vec<RoomType>, ()>>> for Memory<S> {
    type Ok = Vec<RoomType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<RoomType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            let mut all = s.room_types.values().cloned().collect::<Vec<_>>();
            all.sort_by_key(|rt| (rt.created_at, rt.id));
            all
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Insert<RoomType>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room_type): Insert<RoomType>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_state(|s| {
            _ = s.room_types.insert(room_type.id, room_type);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
