//! [`Query`] collection related to a single [`PromoCode`].

use common::operations::By;

use crate::domain::{promo, PromoCode};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`PromoCode`] by its [`promo::Code`].
pub type ByCode = DatabaseQuery<By<Option<PromoCode>, promo::Code>>;
