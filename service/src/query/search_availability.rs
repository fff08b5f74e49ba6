//! [`Query`] for searching [`RoomType`]s bookable for a stay.

use common::{
    operations::{By, Select},
    Date, Stay,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inventory, promo, PromoCode, RoomType},
    infra::{database, Database},
    pricing::{self, Quote},
    read::Offer,
    ErrorKind, Service,
};

use super::Query;

/// [`Query`] for searching [`RoomType`]s bookable for a stay.
#[derive(Clone, Debug)]
pub struct SearchAvailability {
    /// First night of the stay.
    pub check_in: Date,

    /// Departure [`Date`] of the stay, exclusive.
    pub check_out: Date,

    /// [`promo::Code`] to price the stay with, if any.
    ///
    /// Unknown codes, or codes not discounting every night of the stay, leave
    /// the prices undiscounted.
    pub promo_code: Option<promo::Code>,
}

impl<Db> Query<SearchAvailability> for Service<Db>
where
    Db: Database<
            Select<By<Vec<RoomType>, ()>>,
            Ok = Vec<RoomType>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<inventory::Record>, inventory::Selector>>,
            Ok = Vec<inventory::Record>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<PromoCode>, promo::Code>>,
            Ok = Option<PromoCode>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Offer>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: SearchAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SearchAvailability {
            check_in,
            check_out,
            promo_code,
        } = query;

        let stay = Stay::new(check_in, check_out)
            .ok_or(E::InvalidStay {
                check_in,
                check_out,
            })
            .map_err(tracerr::wrap!())?;

        let promo = if let Some(code) = promo_code {
            self.database()
                .execute(Select(By::<Option<PromoCode>, _>::new(code)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            None
        };

        let room_types = self
            .database()
            .execute(Select(By::<Vec<RoomType>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let records = self
            .database()
            .execute(Select(By::<Vec<inventory::Record>, _>::new(
                inventory::Selector {
                    room_type_id: None,
                    dates: stay,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        offers(&room_types, stay, &records, promo.as_ref(), Date::today())
            .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Lists [`Offer`]s of the active [`RoomType`]s having at least one unit free
/// on every night of the [`Stay`].
///
/// The [`PromoCode`] discounts an [`Offer`] only if it can be redeemed
/// `today` for the whole [`Stay`], the same way booking redeems it.
///
/// # Errors
///
/// If some [`Offer`] price overflows.
pub fn offers(
    room_types: &[RoomType],
    stay: Stay,
    records: &[inventory::Record],
    promo: Option<&PromoCode>,
    today: Date,
) -> Result<Vec<Offer>, pricing::Overflow> {
    room_types
        .iter()
        .filter(|rt| rt.is_active)
        .filter_map(|rt| {
            let available_units = inventory::free_units(rt, stay, records);
            let promo =
                promo.filter(|p| p.applies_to_stay(rt.id, stay, today));
            (available_units > 0).then(|| {
                Quote::new(rt, stay, records, promo).map(|quote| Offer {
                    room_type: rt.clone(),
                    available_units,
                    quote,
                })
            })
        })
        .collect()
}

/// Error of [`SearchAvailability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested stay has no nights.
    #[display(
        "`check_out` ({check_out}) must be later than `check_in` ({check_in})"
    )]
    #[from(ignore)]
    InvalidStay {
        /// Requested first night.
        check_in: Date,

        /// Requested departure [`Date`].
        check_out: Date,
    },

    /// Price of an [`Offer`] doesn't fit.
    #[display("`Offer` price overflows")]
    #[from]
    PriceOverflow(pricing::Overflow),
}

impl ExecutionError {
    /// Returns [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) => ErrorKind::PersistenceFailure,
            Self::InvalidStay { .. } | Self::PriceOverflow(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}
