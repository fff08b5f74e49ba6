//! In-memory [`Database`] implementation.

mod impls;

use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    sync::Arc,
};

use common::Date;
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        inventory, promo, reservation, room_type, PromoCode, Reservation,
        RoomType,
    },
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
///
/// Every transaction holds an exclusive lock over the whole [`State`] until
/// it's committed or rolled back, so transactions are applied one at a time.
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Non-transactional [`Memory`] client.
///
/// Each write is applied immediately.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the storage.
    state: Arc<Mutex<State>>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Running transaction, if it wasn't finished yet.
    inner: Arc<Mutex<Option<Staged>>>,
}

/// Changes of a running [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Exclusive lock of the committed [`State`].
    committed: OwnedMutexGuard<State>,

    /// Copy of the committed [`State`] the changes are applied to.
    staged: State,
}

impl Tx {
    /// Starts a new [`Tx`] from the provided [`NonTx`] client, waiting until
    /// all other [`Tx`]s are finished.
    async fn begin(client: &NonTx) -> Self {
        let committed = Arc::clone(&client.state).lock_owned().await;
        let staged = committed.clone();
        Self {
            inner: Arc::new(Mutex::new(Some(Staged { committed, staged }))),
        }
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is finished already.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Staged {
            mut committed,
            staged,
        } = self
            .inner
            .lock()
            .await
            .take()
            .ok_or_else(|| tracerr::new!(Error::Finished))
            .map_err(tracerr::map_from)?;
        *committed = staged;
        Ok(())
    }

    /// Discards all the changes of this [`Tx`].
    pub async fn rollback(&self) {
        drop(self.inner.lock().await.take());
    }
}

/// Contents of a [`Memory`] storage.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`RoomType`]s.
    room_types: HashMap<room_type::Id, RoomType>,

    /// Materialized [`inventory::Record`]s.
    inventory: BTreeMap<(room_type::Id, Date), inventory::Record>,

    /// Stored [`PromoCode`]s.
    promo_codes: HashMap<promo::Code, PromoCode>,

    /// Stored [`Reservation`]s.
    reservations: HashMap<reservation::Id, Reservation>,

    /// Indicator whether writing [`Reservation`]s should fail.
    #[cfg(test)]
    reject_reservations: bool,

    /// ID of the single [`Reservation`] whose writes should fail.
    #[cfg(test)]
    rejected_reservation: Option<reservation::Id>,
}

/// Access to the [`State`] of a [`Memory`] client.
pub trait Storage {
    /// Runs the provided function over the current [`State`].
    ///
    /// # Errors
    ///
    /// If the [`State`] is not accessible anymore.
    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Storage for NonTx {
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&mut *self.state.lock().await))
    }
}

impl Storage for Tx {
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut inner = self.inner.lock().await;
        let staged = inner
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::Finished))
            .map_err(tracerr::map_from)?;
        Ok(f(&mut staged.staged))
    }
}

impl<S: Storage> Memory<S> {
    /// Runs the provided function over the current [`State`] of this
    /// [`Memory`] client.
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.0.with_state(f).await.map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
impl Memory {
    /// Makes every following write of a [`Reservation`] fail.
    pub(crate) async fn reject_reservations(&self) {
        self.0.state.lock().await.reject_reservations = true;
    }

    /// Makes every following write of the [`Reservation`] with the provided
    /// ID fail.
    pub(crate) async fn reject_reservation(&self, id: reservation::Id) {
        self.0.state.lock().await.rejected_reservation = Some(id);
    }

    /// Returns a copy of the committed [`State`].
    pub(crate) async fn snapshot(&self) -> State {
        self.0.state.lock().await.clone()
    }
}

#[cfg(test)]
impl State {
    /// Returns the materialized [`inventory::Record`] of the provided night.
    pub(crate) fn record(
        &self,
        room_type_id: room_type::Id,
        date: Date,
    ) -> Option<inventory::Record> {
        self.inventory.get(&(room_type_id, date)).copied()
    }

    /// Returns all the stored [`Reservation`]s.
    pub(crate) fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    /// Returns the stored [`PromoCode`] with the provided [`promo::Code`].
    pub(crate) fn promo_code(&self, code: &promo::Code) -> Option<&PromoCode> {
        self.promo_codes.get(code)
    }

    /// Returns all the materialized [`inventory::Record`]s.
    pub(crate) fn records(
        &self,
    ) -> impl Iterator<Item = &inventory::Record> {
        self.inventory.values()
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Transaction was committed or rolled back already.
    #[display("Transaction is finished already")]
    Finished,

    /// Write was rejected by the storage.
    #[display("Write was rejected")]
    Rejected,
}
