//! [`Query`] collection related to a single [`RoomType`].

use common::operations::By;

use crate::domain::{room_type, RoomType};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`RoomType`] by its [`room_type::Id`].
pub type ById = DatabaseQuery<By<Option<RoomType>, room_type::Id>>;
