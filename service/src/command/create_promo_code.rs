//! [`Command`] for creating a new [`PromoCode`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{promo, room_type, PromoCode, RoomType},
    infra::{database, Database},
    ErrorKind, Service,
};

use super::Command;

/// [`Command`] for creating a new [`PromoCode`].
#[derive(Clone, Debug)]
pub struct CreatePromoCode {
    /// [`promo::Code`] of a new [`PromoCode`].
    pub code: promo::Code,

    /// [`promo::Discount`] granted by a new [`PromoCode`].
    pub discount: promo::Discount,

    /// Maximum number of redemptions of a new [`PromoCode`].
    pub max_usage: promo::Usage,

    /// IDs of the [`RoomType`]s a new [`PromoCode`] is restricted to.
    ///
    /// Empty means all [`RoomType`]s.
    pub room_type_ids: Vec<room_type::Id>,

    /// First day a new [`PromoCode`] is valid on.
    pub valid_from: Date,

    /// Last day a new [`PromoCode`] is valid on.
    pub valid_until: Date,

    /// Indicator whether a new [`PromoCode`] is enabled.
    pub is_active: bool,
}

impl<Db> Command<CreatePromoCode> for Service<Db>
where
    Db: Database<
            Select<By<Option<RoomType>, room_type::Id>>,
            Ok = Option<RoomType>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<PromoCode, promo::Code>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<PromoCode>, promo::Code>>,
            Ok = Option<PromoCode>,
            Err = Traced<database::Error>,
        > + Database<Insert<PromoCode>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = PromoCode;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePromoCode,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePromoCode {
            code,
            discount,
            max_usage,
            mut room_type_ids,
            valid_from,
            valid_until,
            is_active,
        } = cmd;

        if valid_until < valid_from {
            return Err(tracerr::new!(E::InvalidWindow {
                valid_from,
                valid_until,
            }));
        }

        room_type_ids.sort_unstable();
        room_type_ids.dedup();
        for &id in &room_type_ids {
            self.database()
                .execute(Select(By::<Option<RoomType>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::RoomTypeNotExists(id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        let promo = PromoCode {
            code: code.clone(),
            discount,
            max_usage,
            current_usage: 0,
            room_type_ids,
            valid_from,
            valid_until,
            is_active,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent creation of the same `PromoCode`.
        tx.execute(Lock(By::new(code.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<PromoCode>, _>::new(code.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::PromoCodeExists(code)));
        }

        tx.execute(Insert(promo.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(promo)
    }
}

/// Error of [`CreatePromoCode`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Validity window ends before it starts.
    #[display(
        "`valid_until` ({valid_until}) must not be earlier than `valid_from` \
         ({valid_from})"
    )]
    #[from(ignore)]
    InvalidWindow {
        /// Requested first valid day.
        valid_from: Date,

        /// Requested last valid day.
        valid_until: Date,
    },

    /// [`PromoCode`] with the provided code exists already.
    #[display("`PromoCode(code: {_0})` exists already")]
    #[from(ignore)]
    PromoCodeExists(#[error(not(source))] promo::Code),

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
            Self::Db(_) => ErrorKind::PersistenceFailure,
            Self::InvalidWindow { .. } | Self::PromoCodeExists(_) => {
                ErrorKind::InvalidInput
            }
            Self::RoomTypeNotExists(_) => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{operations::Insert, Percent};

    use crate::{
        domain::{promo, room_type},
        infra::Database as _,
        query::promo_code::ByCode,
        test_support::{date, room_type, service},
        Command as _, ErrorKind, Query as _,
    };

    use super::CreatePromoCode;

    fn create(code: &str) -> CreatePromoCode {
        CreatePromoCode {
            code: promo::Code::new(code).unwrap(),
            discount: promo::Discount::Percentage(
                Percent::from_str("10").unwrap(),
            ),
            max_usage: 10,
            room_type_ids: vec![],
            valid_from: date("2030-01-01"),
            valid_until: date("2030-01-31"),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn creates_normalized_code() {
        let svc = service();

        let created = svc.execute(create("spring30")).await.unwrap();

        assert_eq!(created.code.to_string(), "SPRING30");
        assert_eq!(created.current_usage, 0);
        let found = svc
            .execute(ByCode::by(promo::Code::new("Spring30").unwrap()))
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn rejects_duplicate_code() {
        let svc = service();
        _ = svc.execute(create("SPRING30")).await.unwrap();

        let err = svc.execute(create("spring30")).await.unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn rejects_reversed_window() {
        let svc = service();

        let err = svc
            .execute(CreatePromoCode {
                valid_from: date("2030-02-01"),
                ..create("SPRING30")
            })
            .await
            .unwrap_err();

        assert_eq!(err.as_ref().kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn checks_restricted_room_types() {
        let svc = service();
        let rt = room_type(1);
        svc.database().execute(Insert(rt.clone())).await.unwrap();

        let created = svc
            .execute(CreatePromoCode {
                room_type_ids: vec![rt.id, rt.id],
                ..create("SUITE5")
            })
            .await
            .unwrap();
        assert_eq!(created.room_type_ids, vec![rt.id]);

        let err = svc
            .execute(CreatePromoCode {
                room_type_ids: vec![room_type::Id::new()],
                ..create("SUITE6")
            })
            .await
            .unwrap_err();
        assert_eq!(err.as_ref().kind(), ErrorKind::NotFound);
    }
}
