//! [`Query`] collection related to the inventory ledger.

use common::operations::By;

use crate::domain::inventory::{Record, Selector};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries materialized [`Record`]s matching a [`Selector`].
///
/// Nights without a [`Record`] are omitted.
pub type List = DatabaseQuery<By<Vec<Record>, Selector>>;
