//! [`Reservation`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Stay};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{inventory, promo, room_type};
#[cfg(doc)]
use crate::domain::{PromoCode, RoomType};

/// Booking of a [`RoomType`] unit for a [`Stay`].
#[derive(Clone, Debug)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// [`BookingCode`] of this [`Reservation`] given to the guest.
    pub booking_code: BookingCode,

    /// [`Guest`] this [`Reservation`] is made for.
    pub guest: Guest,

    /// ID of the booked [`RoomType`].
    pub room_type_id: room_type::Id,

    /// Booked nights.
    pub stay: Stay,

    /// Number of people staying.
    pub guests: GuestCount,

    /// Total price of all the booked nights.
    pub total_amount: Money,

    /// [`Status`] of this [`Reservation`].
    pub status: Status,

    /// Code of the [`PromoCode`] applied to this [`Reservation`], if any.
    pub promo_code: Option<promo::Code>,

    /// [`SpecialRequests`] of the guest, if any.
    pub special_requests: Option<SpecialRequests>,

    /// [`DateTime`] when this [`Reservation`] was created.
    pub created_at: CreationDateTime,
}

impl Reservation {
    /// Returns the [`inventory::Hold`] this [`Reservation`] occupies.
    #[must_use]
    pub fn hold(&self) -> inventory::Hold {
        inventory::Hold {
            room_type_id: self.room_type_id,
            stay: self.stay,
        }
    }

    /// Indicates whether this [`Reservation`] still occupies inventory.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        matches!(self.status, Status::Pending | Status::Confirmed)
    }
}

/// ID of a [`Reservation`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Short human-readable code identifying a [`Reservation`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct BookingCode(String);

impl BookingCode {
    /// Characters a generated [`BookingCode`] consists of.
    const ALPHABET: &'static [u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Length of a generated [`BookingCode`].
    pub const LENGTH: usize = 8;

    /// Generates a new random [`BookingCode`].
    #[must_use]
    pub fn generate() -> Self {
        let code = Uuid::new_v4()
            .as_bytes()
            .iter()
            .take(Self::LENGTH)
            .map(|b| char::from(Self::ALPHABET[usize::from(*b) % 36]))
            .collect();
        Self(code)
    }

    /// Creates a new [`BookingCode`] if the given `code` is valid.
    ///
    /// Lower-cased input is accepted and normalized.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Option<Self> {
        let code = code.as_ref().trim().to_uppercase();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given upper-cased `code` is a valid [`BookingCode`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.len() == Self::LENGTH
            && code.bytes().all(|b| Self::ALPHABET.contains(&b))
    }
}

impl FromStr for BookingCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `BookingCode`")
    }
}

/// Person a [`Reservation`] is made for.
#[derive(Clone, Debug)]
pub struct Guest {
    /// [`GuestName`] of this [`Guest`].
    pub name: GuestName,

    /// [`Email`] of this [`Guest`].
    pub email: Email,

    /// [`Phone`] of this [`Guest`].
    pub phone: Phone,
}

/// Full name of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct GuestName(String);

impl GuestName {
    /// Creates a new [`GuestName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`GuestName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 256
    }
}

impl FromStr for GuestName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `GuestName`")
    }
}

/// Email address of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }

    /// Indicates whether this [`Email`] denotes the same mailbox as the
    /// `other` one, ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[+]?\d[\d\s-]{5,18}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Number of people staying under a [`Reservation`].
///
/// Always at least one.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct GuestCount(u16);

impl GuestCount {
    /// Creates a new [`GuestCount`] if the given `count` is positive.
    #[must_use]
    pub fn new(count: u16) -> Option<Self> {
        (count > 0).then_some(Self(count))
    }
}

/// Free-form wishes of a [`Guest`] regarding the stay.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct SpecialRequests(String);

impl SpecialRequests {
    /// Creates new [`SpecialRequests`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is valid [`SpecialRequests`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= 2048
    }
}

impl FromStr for SpecialRequests {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `SpecialRequests`")
    }
}

define_kind! {
    #[doc = "Lifecycle status of a [`Reservation`]."]
    enum Status {
        #[doc = "Admitted and holding inventory, awaiting confirmation."]
        Pending = 1,

        #[doc = "Confirmed by the hotel."]
        Confirmed = 2,

        #[doc = "Cancelled, inventory released."]
        Cancelled = 3,

        #[doc = "Stay is over."]
        Completed = 4,
    }
}

impl Status {
    /// Indicates whether a [`Reservation`] may move from this [`Status`] into
    /// the `next` one.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled | Self::Completed),
        )
    }
}

/// [`DateTime`] when a [`Reservation`] was created.
pub type CreationDateTime = DateTimeOf<(Reservation, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{BookingCode, Email, GuestCount, Phone, Status};

    #[test]
    fn generated_booking_codes_are_valid() {
        for _ in 0..100 {
            let code = BookingCode::generate();

            assert_eq!(code.to_string().len(), BookingCode::LENGTH);
            assert_eq!(BookingCode::new(code.to_string()), Some(code));
        }
    }

    #[test]
    fn booking_code_is_case_insensitive() {
        assert_eq!(
            BookingCode::new("ab12cd34").map(|c| c.to_string()),
            Some("AB12CD34".into()),
        );
        assert!(BookingCode::new("AB12CD3").is_none());
        assert!(BookingCode::new("AB12-D34").is_none());
    }

    #[test]
    fn guest_contacts() {
        assert!(Email::new("guest@example.com").is_some());
        assert!(Email::new("guest@localhost").is_none());
        assert!(Email::new("guest example.com").is_none());
        assert!(Email::new("").is_none());

        assert!(Phone::new("+6281234567890").is_some());
        assert!(Phone::new("0812-3456-7890").is_some());
        assert!(Phone::new("call me").is_none());
        assert!(Phone::new("+62").is_none());

        assert!(GuestCount::new(0).is_none());
        assert!(GuestCount::new(2).is_some());
    }

    #[test]
    fn status_transitions() {
        use Status as S;

        assert!(S::Pending.can_become(S::Confirmed));
        assert!(S::Pending.can_become(S::Cancelled));
        assert!(S::Confirmed.can_become(S::Cancelled));
        assert!(S::Confirmed.can_become(S::Completed));

        assert!(!S::Pending.can_become(S::Completed));
        assert!(!S::Cancelled.can_become(S::Cancelled));
        assert!(!S::Cancelled.can_become(S::Confirmed));
        assert!(!S::Completed.can_become(S::Cancelled));
    }
}
