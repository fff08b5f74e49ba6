//! Read entities definitions.

pub mod availability;
pub mod dashboard;
pub mod reservation;

pub use self::{availability::Offer, dashboard::Dashboard};
