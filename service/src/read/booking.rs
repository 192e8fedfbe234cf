//! [`Booking`]-related read definitions.

use common::{Date, DateRange};

#[cfg(doc)]
use crate::domain::{Booking, Vehicle};
use crate::domain::{booking::Status, vehicle};

/// Criteria of matching [`Booking`]s of a [`Vehicle`] overlapping a period.
///
/// A [`Booking`] overlaps once its pickup day is not past the end of the
/// `period` and its return day is not before the start of it.
#[derive(Clone, Copy, Debug)]
pub struct Overlapping {
    /// ID of the booked [`Vehicle`].
    pub vehicle_id: vehicle::Id,

    /// Period to intersect the booked periods with.
    pub period: DateRange,

    /// [`Status`] the matched [`Booking`]s must be in.
    pub status: Status,
}

impl Overlapping {
    /// Creates new [`Overlapping`] criteria matching [`Status::Confirmed`]
    /// [`Booking`]s, the ones actually reserving a [`Vehicle`].
    #[must_use]
    pub const fn confirmed(
        vehicle_id: vehicle::Id,
        period: DateRange,
    ) -> Self {
        Self { vehicle_id, period, status: Status::Confirmed }
    }
}

/// Criteria of matching [`Booking`]s scheduled to touch a branch on a
/// single [`Date`].
#[derive(Clone, Copy, Debug)]
pub struct ScheduledFor {
    /// [`Date`] of the day in question.
    pub date: Date,

    /// [`Waypoint`] of the rental falling on the `date`.
    pub waypoint: Waypoint,

    /// [`Status`] the matched [`Booking`]s must be in.
    pub status: Status,
}

impl ScheduledFor {
    /// [`Status::Confirmed`] [`Booking`]s to be picked up on the `date`.
    #[must_use]
    pub const fn pickups(date: Date) -> Self {
        Self { date, waypoint: Waypoint::Pickup, status: Status::Confirmed }
    }

    /// [`Status::Confirmed`] [`Booking`]s to be returned on the `date`.
    #[must_use]
    pub const fn returns(date: Date) -> Self {
        Self { date, waypoint: Waypoint::Return, status: Status::Confirmed }
    }

    /// [`Status::Requested`] [`Booking`]s asking for a pickup on the `date`.
    #[must_use]
    pub const fn requests(date: Date) -> Self {
        Self { date, waypoint: Waypoint::Pickup, status: Status::Requested }
    }
}

/// Waypoint of a rental inside its booked period.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Waypoint {
    /// Day the [`Vehicle`] leaves its branch.
    Pickup,

    /// Day the [`Vehicle`] comes back.
    Return,
}
