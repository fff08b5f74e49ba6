//! [`Command`] for creating a new [`RoomType`].

use common::{operations::Insert, DateTime, Money};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{room_type, RoomType},
    infra::{database, Database},
    ErrorKind, Service,
};

use super::Command;

/// [`Command`] for creating a new [`RoomType`].
#[derive(Clone, Debug)]
pub struct CreateRoomType {
    /// [`room_type::Name`] of a new [`RoomType`].
    pub name: room_type::Name,

    /// Nightly rate of a new [`RoomType`].
    pub base_price: Money,

    /// Default number of units sellable per night.
    pub total_units: room_type::Units,

    /// Indicator whether a new [`RoomType`] can be booked right away.
    pub is_active: bool,
}

impl<Db> Command<CreateRoomType> for Service<Db>
where
    Db: Database<Insert<RoomType>, Err = Traced<database::Error>>,
{
    type Ok = RoomType;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateRoomType,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoomType {
            name,
            base_price,
            total_units,
            is_active,
        } = cmd;

        if !base_price.is_valid_price() {
            return Err(tracerr::new!(E::InvalidPrice(base_price)));
        }

        let room_type = RoomType {
            id: room_type::Id::new(),
            name,
            base_price,
            total_units,
            is_active,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(room_type.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room_type)
    }
}

/// Error of [`CreateRoomType`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided nightly rate is negative, fractional or too big.
    #[display("Nightly rate is not a valid price: {_0}")]
    #[from(ignore)]
    InvalidPrice(#[error(not(source))] Money),
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) => ErrorKind::PersistenceFailure,
            Self::InvalidPrice(_) => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::money::MAX_PRICE_UNITS;
    use rust_decimal::Decimal;

    use crate::{
        domain::room_type,
        query::{room_type::ById, room_types},
        test_support::{idr, service},
        Command as _, ErrorKind, Query as _,
    };

    use super::CreateRoomType;

    #[tokio::test]
    async fn creates_and_reads_back() {
        let svc = service();

        let created = svc
            .execute(CreateRoomType {
                name: room_type::Name::new("Family Suite").unwrap(),
                base_price: idr(2_500_000),
                total_units: 4,
                is_active: true,
            })
            .await
            .unwrap();

        let found = svc.execute(ById::by(created.id)).await.unwrap().unwrap();
        assert_eq!(found.name, created.name);
        assert_eq!(found.total_units, 4);
    }

    #[tokio::test]
    async fn rejects_invalid_prices() {
        let svc = service();

        for amount in [
            Decimal::from(-1),
            Decimal::new(10_005, 1),
            Decimal::from(MAX_PRICE_UNITS) + Decimal::ONE,
            Decimal::MAX,
        ] {
            let err = svc
                .execute(CreateRoomType {
                    name: room_type::Name::new("Broken").unwrap(),
                    base_price: idr(0).with_amount(amount),
                    total_units: 1,
                    is_active: true,
                })
                .await
                .unwrap_err();

            assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
        }
        let all = svc.execute(room_types::All::by(())).await.unwrap();
        assert!(all.is_empty());
    }
}
