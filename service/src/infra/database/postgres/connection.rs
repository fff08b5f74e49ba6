//! Raw Postgres [`Connection`]s taken from a [`Pool`].

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Statement execution over a Postgres session, either a plain or a
/// transactional one.
///
/// Every method fails if Postgres rejects the statement or the session is
/// broken.
pub trait Connection {
    /// Runs the `stmt` and collects all the returned [`Row`]s.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the `stmt` expecting at most one [`Row`] back.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the `stmt` returning how many rows it touched.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Implements [`Connection`] for the `$ty` by running statements on the
/// [`tokio_postgres`] session the `$session` expression yields for `$this`.
macro_rules! impl_connection_via_session {
    ($ty:ty, |$this:ident| $session:expr) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $session
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $session
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $session
                    .execute(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }
        }
    };
}

impl_connection_via_session!(NonTx, |conn| (**conn));
impl_connection_via_session!(Tx, |conn| conn.tx());

/// Pooled [`NonTx`] connection with an open transaction on it.
///
/// The transaction is finished either by [`Tx::commit()`] or by
/// [`Tx::rollback()`]. Dropping a [`Tx`] without them rolls it back.
#[self_referencing]
pub struct Tx {
    /// Connection the transaction runs on.
    non_tx: NonTx,

    /// Open transaction, [`None`] once finished.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("tx", self.tx())
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Opens a transaction on the provided [`NonTx`] connection.
    ///
    /// # Errors
    ///
    /// If Postgres refuses to `BEGIN` the transaction.
    pub async fn from_non_tx(
        conn: NonTx,
    ) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(conn, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Makes the changes of this [`Tx`] durable.
    ///
    /// # Errors
    ///
    /// If Postgres fails to `COMMIT`, in which case nothing is persisted.
    #[expect(clippy::missing_panics_doc, reason = "finished only once")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "`Option::take` cannot be passed due to invariance of \
                      the borrowed lifetime"
        )]
        self.with_tx_mut(|tx| tx.take())
            .expect("transaction is finished only once")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Discards the changes of this [`Tx`].
    ///
    /// # Errors
    ///
    /// If Postgres fails to `ROLLBACK`.
    #[expect(clippy::missing_panics_doc, reason = "finished only once")]
    pub async fn rollback(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "`Option::take` cannot be passed due to invariance of \
                      the borrowed lifetime"
        )]
        self.with_tx_mut(|tx| tx.take())
            .expect("transaction is finished only once")
            .rollback()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the open transaction of this [`Tx`].
    fn tx(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("transaction is finished"))
    }
}
