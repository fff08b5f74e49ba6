//! [`Command`] for changing sellable units, rates and sale status of a
//! [`RoomType`] for a range of nights.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, Money, Stay,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{inventory, room_type, RoomType},
    infra::{database, Database},
    ErrorKind, Service,
};
#[cfg(doc)]
use crate::domain::inventory::Record;

use super::Command;

/// [`Command`] for changing sellable units, rates and sale status of a
/// [`RoomType`] for a range of nights.
///
/// [`None`] fields are left untouched.
#[derive(Clone, Copy, Debug)]
pub struct UpdateInventory {
    /// ID of the [`RoomType`] to update inventory of.
    pub room_type_id: room_type::Id,

    /// First night to update.
    pub start_date: Date,

    /// Last night to update, inclusive.
    pub end_date: Date,

    /// New number of sellable units per night.
    pub total_units: Option<room_type::Units>,

    /// New nightly rate overriding the [`RoomType::base_price`].
    pub rate: Option<Money>,

    /// New sale status of the nights.
    pub is_closed: Option<bool>,
}

impl<Db> Command<UpdateInventory> for Service<Db>
where
    Db: Database<
            Select<By<Option<RoomType>, room_type::Id>>,
            Ok = Option<RoomType>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vec<inventory::Record>, inventory::Selector>>,
            Ok = Vec<inventory::Record>,
            Err = Traced<database::Error>,
        > + Database<
            Update<inventory::Allotment>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vec<inventory::Record>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateInventory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateInventory {
            room_type_id,
            start_date,
            end_date,
            total_units,
            rate,
            is_closed,
        } = cmd;

        let dates = end_date
            .next()
            .and_then(|after| Stay::new(start_date, after))
            .ok_or(E::InvalidRange {
                start_date,
                end_date,
            })
            .map_err(tracerr::wrap!())?;

        let allotment = inventory::Allotment {
            room_type_id,
            dates,
            total_units,
            rate,
            is_closed,
        };
        if allotment.is_empty() {
            return Err(tracerr::new!(E::NothingToUpdate));
        }

        let room_type = self
            .database()
            .execute(Select(By::<Option<RoomType>, _>::new(room_type_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomTypeNotExists(room_type_id))
            .map_err(tracerr::wrap!())?;

        if let Some(rate) = rate {
            if rate.currency != room_type.base_price.currency
                || !rate.is_valid_price()
            {
                return Err(tracerr::new!(E::InvalidRate(rate)));
            }
        }

        let selector = inventory::Selector {
            room_type_id: Some(room_type_id),
            dates,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Locked rows keep concurrent bookings from selling units in between
        // the check and the update.
        let records = tx
            .execute(Lock(By::<Vec<inventory::Record>, _>::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(total_units) = total_units {
            if let Some(r) = records.iter().find(|r| r.sold_units > total_units)
            {
                return Err(tracerr::new!(E::BelowSold {
                    date: r.date,
                    sold_units: r.sold_units,
                }));
            }
        }

        tx.execute(Update(allotment))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let records = tx
            .execute(Lock(By::<Vec<inventory::Record>, _>::new(selector)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`RoomType(id: {room_type_id})` inventory updated for {dates}: \
             total_units={total_units:?}, rate={rate:?}, \
             is_closed={is_closed:?}",
        );

        Ok(records)
    }
}

/// Error of [`UpdateInventory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Requested units are fewer than already sold on a night.
    #[display("{sold_units} units are sold already on {date}")]
    #[from(ignore)]
    BelowSold {
        /// Night the units are sold on.
        date: Date,

        /// Number of units sold on the night.
        sold_units: room_type::Units,
    },

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested range has no nights.
    #[display(
        "`end_date` ({end_date}) must not be earlier than `start_date` \
         ({start_date})"
    )]
    #[from(ignore)]
    InvalidRange {
        /// Requested first night.
        start_date: Date,

        /// Requested last night.
        end_date: Date,
    },

    /// Requested rate is not a valid price in the [`RoomType`] currency.
    #[display("`{_0}` is not a valid rate of the `RoomType`")]
    #[from(ignore)]
    InvalidRate(#[error(not(source))] Money),

    /// None of the [`Record`] fields is requested to change.
    #[display("nothing to update")]
    NothingToUpdate,

    /// [`RoomType`] with the provided ID does not exist.
    #[display("`RoomType(id: {_0})` does not exist")]
    #[from(ignore)]
    RoomTypeNotExists(#[error(not(source))] room_type::Id),
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BelowSold { .. }
            | Self::InvalidRange { .. }
            | Self::InvalidRate(_)
            | Self::NothingToUpdate => ErrorKind::InvalidInput,
            Self::Db(_) => ErrorKind::PersistenceFailure,
            Self::RoomTypeNotExists(_) => ErrorKind::NotFound,
        }
    }
}
