//! [`Database`] backed by Postgres.
//!
//! Inventory, promo redemptions and reservations live in the tables created by
//! the [`embed_migrations`]-embedded migrations, while concurrent admissions
//! are serialized with row locks taken inside a [`Tx`].

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::Config;
pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

/// Postgres [`Database`] client, either outside of a transaction ([`NonTx`])
/// or inside one ([`Tx`]).
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client pooling connections per the provided
    /// [`Config`].
    ///
    /// No connection is established until the first operation is executed.
    ///
    /// # Errors
    ///
    /// If the [`Config`] doesn't describe a valid connection pool.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        conf.create_pool(Some(Runtime::Tokio1), NoTls)
            .map(|pool| Self(NonTx::from_pool(pool)))
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres [`Database`] error.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Executing a statement failed.
    #[display("statement failed: {_0}")]
    Query(connection::Error),

    /// [`Config`] doesn't describe a valid [`connection::Pool`].
    #[display("cannot build `connection::Pool`: {_0}")]
    PoolCreation(connection::PoolCreationError),

    /// No connection could be taken from the [`connection::Pool`].
    #[display("cannot take a connection from `connection::Pool`: {_0}")]
    Pool(connection::PoolError),
}
