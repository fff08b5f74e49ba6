//! Service contains the business logic of the hotel reservation backend.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod pricing;
pub mod query;
pub mod read;
pub mod task;

use common::operations::{By, Start};
use derive_more::{Debug, Display, Error};

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Number of attempts to generate a [`BookingCode`] not used by any other
    /// [`Reservation`].
    ///
    /// [`BookingCode`]: domain::reservation::BookingCode
    /// [`Reservation`]: domain::Reservation
    pub booking_code_attempts: u8,

    /// [`task::CompletePastReservations`] configuration.
    pub complete_past_reservations: task::complete_past_reservations::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, without
    /// starting any background [`Task`]s.
    #[must_use]
    pub fn without_tasks(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::CompletePastReservations<Self>,
                        task::complete_past_reservations::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Self::without_tasks(config, database);

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("complete_past_reservations", async move {
            svc.execute(Start(By::new(svc.config().complete_past_reservations)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}

/// Kind of a [`Command`] or [`Query`] failure.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Request is malformed or not allowed in the current state.
    #[display("invalid input")]
    InvalidInput,

    /// Requested entity does not exist.
    #[display("not found")]
    NotFound,

    /// Requested inventory is sold out.
    #[display("unavailable")]
    Unavailable,

    /// Supplied promo code cannot be used.
    #[display("invalid promo")]
    InvalidPromo,

    /// Storage failed to fulfill the request.
    #[display("persistence failure")]
    PersistenceFailure,
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
        Start<
            By<
                task::CompletePastReservations<Svc>,
                task::complete_past_reservations::Config,
            >,
        >,
    >,
{
    /// [`task::CompletePastReservations`] failed to start.
    CompletePastReservationsTask(
        TaskStartError<
            Svc,
            task::CompletePastReservations<Svc>,
            task::complete_past_reservations::Config,
        >,
    ),
}

#[cfg(test)]
mod test_support {
    //! Fixtures shared by [`Command`] and [`Query`] tests.

    use std::{str::FromStr as _, time::Duration};

    use common::{money::Currency, Date, DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            promo::{self, Discount},
            reservation, room_type, PromoCode, RoomType,
        },
        infra::Memory,
        task, Config, Service,
    };

    pub(crate) fn service() -> Service<Memory> {
        Service::without_tasks(
            Config {
                booking_code_attempts: 5,
                complete_past_reservations:
                    task::complete_past_reservations::Config {
                        interval: Duration::from_secs(3600),
                    },
            },
            Memory::new(),
        )
    }

    pub(crate) fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    pub(crate) fn idr(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Idr,
        }
    }

    pub(crate) fn room_type(total_units: room_type::Units) -> RoomType {
        RoomType {
            id: room_type::Id::new(),
            name: room_type::Name::new("Deluxe Room").unwrap(),
            base_price: idr(1_000_000),
            total_units,
            is_active: true,
            created_at: DateTime::now().coerce(),
        }
    }

    pub(crate) fn promo(code: &str, percent: &str) -> PromoCode {
        let today = Date::today();
        PromoCode {
            code: promo::Code::new(code).unwrap(),
            discount: Discount::Percentage(Percent::from_str(percent).unwrap()),
            max_usage: 100,
            current_usage: 0,
            room_type_ids: vec![],
            valid_from: today.previous().unwrap(),
            valid_until: date("2099-12-31"),
            is_active: true,
            created_at: DateTime::now().coerce(),
        }
    }

    pub(crate) fn guest() -> reservation::Guest {
        reservation::Guest {
            name: reservation::GuestName::new("Budi Santoso").unwrap(),
            email: reservation::Email::new("budi@example.com").unwrap(),
            phone: reservation::Phone::new("+6281234567890").unwrap(),
        }
    }
}
