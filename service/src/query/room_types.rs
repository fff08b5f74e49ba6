//! [`Query`] collection related to multiple [`RoomType`]s.

use common::operations::By;

use crate::domain::RoomType;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`RoomType`]s, including inactive ones, in the order of
/// their creation.
pub type All = DatabaseQuery<By<Vec<RoomType>, ()>>;
