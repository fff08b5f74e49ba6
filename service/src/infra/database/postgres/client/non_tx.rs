//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection as _},
};

use super::{get_or_try_init, impl_connection_via_lazy};

/// Postgres database client running every statement in its own implicit
/// transaction.
///
/// Clones share the same pooled connection.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] the connection is acquired from.
    pub(crate) pool: connection::Pool,

    /// Connection acquired on first use.
    connection: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the connection of this [`NonTx`] client, acquiring it from the
    /// [`connection::Pool`] if there is none yet.
    pub(crate) async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        get_or_try_init(&self.connection, || async {
            self.pool
                .get()
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)
        })
        .await
    }

    /// Detaches the connection from this [`NonTx`] client, if it has one, so
    /// a transaction can be started on it.
    #[must_use]
    pub(crate) async fn take_connection(&self) -> Option<connection::NonTx> {
        self.connection.write().await.take()
    }
}

impl_connection_via_lazy!(NonTx);
