//! [`Command`] definition.

pub mod cancel_reservation;
pub mod complete_reservation;
pub mod confirm_reservation;
pub mod create_promo_code;
pub mod create_reservation;
pub mod create_room_type;
pub mod update_inventory;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_reservation::CancelReservation,
    complete_reservation::CompleteReservation,
    confirm_reservation::ConfirmReservation,
    create_promo_code::CreatePromoCode,
    create_reservation::CreateReservation, create_room_type::CreateRoomType,
    update_inventory::UpdateInventory,
};
