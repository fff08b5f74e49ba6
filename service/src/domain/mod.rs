//! Domain definitions.

pub mod inventory;
pub mod promo;
pub mod reservation;
pub mod room_type;

pub use self::{
    promo::PromoCode, reservation::Reservation, room_type::RoomType,
};
