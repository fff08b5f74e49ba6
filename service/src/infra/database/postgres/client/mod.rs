//! Postgres database clients lazily acquiring a [`Connection`] on first use.

pub mod non_tx;
pub mod tx;

use std::future::Future;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database;

#[cfg(doc)]
use super::Connection;

pub use self::{non_tx::NonTx, tx::Tx};

/// Implements [`Connection`] for the `$client` by forwarding every statement
/// to the [`Connection`] returned by its `connection()` method.
macro_rules! impl_connection_via_lazy {
    ($client:ty) => {
        impl $crate::infra::database::postgres::Connection for $client {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                Vec<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                Option<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<u64, ::tracerr::Traced<$crate::infra::database::Error>>
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}
pub(crate) use impl_connection_via_lazy;

/// Read-locks the `slot`, filling it with the value produced by `init` first
/// if it's empty.
///
/// Concurrent callers hitting an empty `slot` run `init` at most once, as the
/// emptiness is re-checked under the write lock.
async fn get_or_try_init<'s, T, F, Fut>(
    slot: &'s RwLock<Option<T>>,
    init: F,
) -> Result<RwLockReadGuard<'s, T>, Traced<database::Error>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, Traced<database::Error>>>,
{
    let filled = slot.read().await;
    if filled.is_some() {
        return Ok(RwLockReadGuard::map(filled, |v| {
            v.as_ref().expect("checked to be `Some` above")
        }));
    }
    drop(filled);

    let mut empty = slot.write().await;
    if empty.is_none() {
        *empty = Some(init().await.map_err(tracerr::wrap!())?);
    }
    Ok(RwLockReadGuard::map(empty.downgrade(), |v| {
        v.as_ref().expect("filled under the write lock above")
    }))
}
