//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection as _},
};

use super::{get_or_try_init, impl_connection_via_lazy, NonTx};

/// Postgres database client running all its statements in a single
/// transaction.
///
/// The transaction is `BEGIN`ed lazily by the first statement, so a [`Tx`]
/// client that executed nothing never touches the database.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Shared state of this client.
    inner: Arc<Inner>,
}

/// Shared state of a [`Tx`] client.
#[derive(Debug)]
struct Inner {
    /// [`NonTx`] client whose connection is reused for the transaction, until
    /// the transaction is started.
    origin: Mutex<Option<NonTx>>,

    /// [`connection::Pool`] to acquire a connection from, if the `origin` has
    /// none.
    pool: connection::Pool,

    /// Transaction started on first use.
    tx: RwLock<Option<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client reusing the connection of the provided
    /// [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            inner: Arc::new(Inner {
                pool: client.pool.clone(),
                origin: Mutex::new(Some(client)),
                tx: RwLock::new(None),
            }),
        }
    }

    /// Returns the transaction of this [`Tx`] client, starting it if there is
    /// none yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        get_or_try_init(&self.inner.tx, || async {
            let reused = match self.inner.origin.lock().await.take() {
                Some(origin) => origin.take_connection().await,
                None => None,
            };
            let conn = match reused {
                Some(conn) => conn,
                None => self
                    .inner
                    .pool
                    .get()
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?,
            };
            connection::Tx::from_non_tx(conn)
                .await
                .map_err(tracerr::wrap!())
        })
        .await
    }

    /// Commits the transaction of this [`Tx`] client, if it was started.
    ///
    /// # Errors
    ///
    /// If Postgres fails to `COMMIT`.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.inner.tx.write().await.take() {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }

    /// Rolls back the transaction of this [`Tx`] client, if it was started.
    ///
    /// # Errors
    ///
    /// If Postgres fails to `ROLLBACK`.
    pub async fn rollback(&self) -> Result<(), Traced<database::Error>> {
        match self.inner.tx.write().await.take() {
            Some(tx) => tx.rollback().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

impl_connection_via_lazy!(Tx);
