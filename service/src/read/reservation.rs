//! [`Reservation`]-related read definitions.

use common::{Date, Stay};

use crate::domain::{reservation, Reservation};

/// Filter of a [`Reservation`] list.
///
/// Empty [`Filter`] matches every [`Reservation`].
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// [`reservation::Email`] of the guest, compared case-insensitively.
    pub guest_email: Option<reservation::Email>,

    /// [`reservation::Status`] of the [`Reservation`].
    pub status: Option<reservation::Status>,

    /// Latest check-out [`Date`] of the [`Reservation`], inclusive.
    pub check_out_until: Option<Date>,

    /// Nights the check-in [`Date`] of the [`Reservation`] falls on.
    pub check_in_within: Option<Stay>,

    /// Maximum number of [`Reservation`]s to list.
    pub limit: Option<u16>,
}

impl Filter {
    /// Indicates whether the provided [`Reservation`] is matched by this
    /// [`Filter`].
    ///
    /// [`Filter::limit`] is not considered here.
    #[must_use]
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.guest_email
            .as_ref()
            .map_or(true, |e| e.matches(&reservation.guest.email))
            && self.status.map_or(true, |s| s == reservation.status)
            && self
                .check_out_until
                .map_or(true, |d| reservation.stay.check_out() <= d)
            && self
                .check_in_within
                .map_or(true, |s| s.contains(reservation.stay.check_in()))
    }
}
