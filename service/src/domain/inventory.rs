//! Inventory ledger definitions.

use common::{Date, Money, Stay};

use crate::domain::{room_type, RoomType};

/// Number of [`RoomType`] units sold and sellable on a single night, along
/// with the rate and sale status of the night.
///
/// Absence of a [`Record`] for a night means the whole default inventory of
/// the [`RoomType`] is available at its base price.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Record {
    /// ID of the [`RoomType`] this [`Record`] belongs to.
    pub room_type_id: room_type::Id,

    /// Night this [`Record`] describes.
    pub date: Date,

    /// Number of units sellable on the night.
    pub total_units: room_type::Units,

    /// Number of units already sold on the night.
    ///
    /// Never exceeds [`Record::total_units`].
    pub sold_units: room_type::Units,

    /// Nightly rate overriding the [`RoomType::base_price`], if any.
    pub rate: Option<Money>,

    /// Indicator whether the sale of the night is stopped.
    pub is_closed: bool,
}

impl Record {
    /// Creates a [`Record`] of a night with nothing sold yet.
    #[must_use]
    pub fn vacant(room_type: &RoomType, date: Date) -> Self {
        Self {
            room_type_id: room_type.id,
            date,
            total_units: room_type.total_units,
            sold_units: 0,
            rate: None,
            is_closed: false,
        }
    }

    /// Returns the number of units still available on the night.
    ///
    /// Closed nights have none.
    #[must_use]
    pub fn available_units(&self) -> room_type::Units {
        if self.is_closed {
            0
        } else {
            self.total_units.saturating_sub(self.sold_units)
        }
    }
}

/// One unit of a [`RoomType`] held for every night of a [`Stay`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Hold {
    /// ID of the held [`RoomType`].
    pub room_type_id: room_type::Id,

    /// Nights the unit is held for.
    pub stay: Stay,
}

/// Selector of [`Record`]s for a range of nights.
#[derive(Clone, Copy, Debug)]
pub struct Selector {
    /// ID of the [`RoomType`] to select [`Record`]s of.
    ///
    /// All [`RoomType`]s are selected if [`None`].
    pub room_type_id: Option<room_type::Id>,

    /// Nights to select [`Record`]s for.
    pub dates: Stay,
}

impl Selector {
    /// Indicates whether the provided [`Record`] is matched by this
    /// [`Selector`].
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.room_type_id.map_or(true, |id| id == record.room_type_id)
            && self.dates.contains(record.date)
    }
}

/// Changes of [`Record`]s of a [`RoomType`] for a range of nights.
///
/// [`None`] fields are left untouched, or take their defaults for nights
/// without a [`Record`] yet.
#[derive(Clone, Copy, Debug)]
pub struct Allotment {
    /// ID of the [`RoomType`] to change [`Record`]s of.
    pub room_type_id: room_type::Id,

    /// Nights to change [`Record`]s of.
    pub dates: Stay,

    /// New number of sellable units per night.
    pub total_units: Option<room_type::Units>,

    /// New nightly rate overriding the [`RoomType::base_price`].
    pub rate: Option<Money>,

    /// New sale status of the nights.
    pub is_closed: Option<bool>,
}

impl Allotment {
    /// Indicates whether this [`Allotment`] changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_units.is_none()
            && self.rate.is_none()
            && self.is_closed.is_none()
    }

    /// Applies this [`Allotment`] to the provided [`Record`] of one of its
    /// nights.
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(units) = self.total_units {
            record.total_units = units;
        }
        if let Some(rate) = self.rate {
            record.rate = Some(rate);
        }
        if let Some(closed) = self.is_closed {
            record.is_closed = closed;
        }
    }
}

/// Finds the [`Record`] of the [`RoomType`] for the provided `night`.
///
/// `records` may contain [`Record`]s of other [`RoomType`]s or nights, they're
/// ignored.
#[must_use]
pub fn record_of(
    room_type_id: room_type::Id,
    night: Date,
    records: &[Record],
) -> Option<&Record> {
    records
        .iter()
        .find(|r| r.room_type_id == room_type_id && r.date == night)
}

/// Returns the number of units of the [`RoomType`] free on every night of the
/// provided [`Stay`].
///
/// A single closed night leaves nothing free. `records` may contain
/// [`Record`]s of other [`RoomType`]s or nights, they're ignored.
#[must_use]
pub fn free_units(
    room_type: &RoomType,
    stay: Stay,
    records: &[Record],
) -> room_type::Units {
    stay.nights()
        .map(|night| {
            record_of(room_type.id, night, records)
                .map_or(room_type.total_units, Record::available_units)
        })
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{money::Currency, Date, DateTime, Money, Stay};
    use rust_decimal::Decimal;

    use crate::domain::{room_type, RoomType};

    use super::{free_units, Allotment, Record};

    fn date(s: &str) -> Date {
        Date::from_str(s).unwrap()
    }

    fn room_type(total_units: room_type::Units) -> RoomType {
        RoomType {
            id: room_type::Id::new(),
            name: room_type::Name::new("Deluxe").unwrap(),
            base_price: Money {
                amount: Decimal::from(1_000_000),
                currency: Currency::Idr,
            },
            total_units,
            is_active: true,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn absent_records_mean_full_inventory() {
        let rt = room_type(5);
        let stay = Stay::new(date("2025-01-18"), date("2025-01-20")).unwrap();

        assert_eq!(free_units(&rt, stay, &[]), 5);
    }

    #[test]
    fn tightest_night_limits_the_stay() {
        let rt = room_type(5);
        let other = room_type(5);
        let stay = Stay::new(date("2025-01-18"), date("2025-01-21")).unwrap();
        let records = [
            Record {
                sold_units: 2,
                ..Record::vacant(&rt, date("2025-01-18"))
            },
            Record {
                sold_units: 4,
                ..Record::vacant(&rt, date("2025-01-19"))
            },
            Record {
                sold_units: 5,
                ..Record::vacant(&rt, date("2025-01-21"))
            },
            Record {
                sold_units: 5,
                ..Record::vacant(&other, date("2025-01-20"))
            },
        ];

        assert_eq!(free_units(&rt, stay, &records), 1);
    }

    #[test]
    fn closed_night_leaves_nothing() {
        let rt = room_type(5);
        let stay = Stay::new(date("2025-02-01"), date("2025-02-04")).unwrap();
        let records = [Record {
            is_closed: true,
            ..Record::vacant(&rt, date("2025-02-03"))
        }];

        assert_eq!(records[0].available_units(), 0);
        assert_eq!(free_units(&rt, stay, &records), 0);
        let before = Stay::new(date("2025-02-01"), date("2025-02-03")).unwrap();
        assert_eq!(free_units(&rt, before, &records), 5);
    }

    #[test]
    fn allotment_changes_only_provided_fields() {
        let rt = room_type(5);
        let night = date("2025-03-01");
        let rate = Money {
            amount: Decimal::from(750_000),
            currency: Currency::Idr,
        };
        let mut record = Record {
            sold_units: 2,
            ..Record::vacant(&rt, night)
        };
        let allotment = Allotment {
            room_type_id: rt.id,
            dates: Stay::night(night).unwrap(),
            total_units: None,
            rate: Some(rate),
            is_closed: None,
        };

        allotment.apply_to(&mut record);

        assert_eq!((record.total_units, record.sold_units), (5, 2));
        assert_eq!(record.rate, Some(rate));
        assert!(!record.is_closed);
        assert!(!allotment.is_empty());
        assert!(Allotment {
            rate: None,
            ..allotment
        }
        .is_empty());
    }

    #[test]
    fn sold_out_night_leaves_nothing() {
        let rt = room_type(1);
        let stay = Stay::new(date("2025-02-01"), date("2025-02-03")).unwrap();
        let records = [Record {
            sold_units: 1,
            ..Record::vacant(&rt, date("2025-02-02"))
        }];

        assert_eq!(free_units(&rt, stay, &records), 0);
    }
}
