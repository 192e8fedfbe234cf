//! [`Booking`] definitions.

use std::time::Duration;

use common::{
    define_kind, unit, Date, DateRange, DateTime, DateTimeOf, Money,
};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Customer, Vehicle};
use crate::domain::{
    customer,
    vehicle::{self, Location, Mileage},
};

/// Booking of a [`Vehicle`] by a [`Customer`] for a period of [`Date`]s.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`Customer`] who booked.
    pub customer_id: customer::Id,

    /// ID of the booked [`Vehicle`].
    pub vehicle_id: vehicle::Id,

    /// Booked period, from the pickup [`Date`] to the return one.
    pub period: DateRange,

    /// [`Location`] of the branch the [`Vehicle`] is picked up at.
    pub pickup_location: Location,

    /// [`Location`] of the branch the [`Vehicle`] is returned to.
    pub return_location: Location,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// Total price of this [`Booking`], frozen at creation.
    pub total_price: Money,

    /// Part of the total price covering the selected [`Extras`].
    pub extras_cost: Money,

    /// [`Extras`] selected for this [`Booking`].
    pub extras: Extras,

    /// [`Checkout`] record, present once the [`Vehicle`] has been handed
    /// out.
    pub checkout: Option<Checkout>,

    /// [`Checkin`] record, present once the [`Vehicle`] has been returned.
    pub checkin: Option<Checkin>,

    /// [`DateTime`] when this [`Booking`] was cancelled, if it was.
    pub cancelled_at: Option<CancellationDateTime>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,
}

impl Booking {
    /// [`Date`] the booked [`Vehicle`] is to be picked up on.
    #[must_use]
    pub const fn pickup_date(&self) -> Date {
        self.period.start()
    }

    /// [`Date`] the booked [`Vehicle`] is to be returned on.
    #[must_use]
    pub const fn return_date(&self) -> Date {
        self.period.end()
    }

    /// Confirms this [`Booking`], reserving the booked [`Vehicle`].
    ///
    /// # Errors
    ///
    /// If this [`Booking`] is not a [`Status::Requested`] one.
    pub fn confirm(&mut self) -> Result<(), NotRequested> {
        if self.status != Status::Requested {
            return Err(NotRequested(self.status));
        }
        self.status = Status::Confirmed;
        Ok(())
    }

    /// Cancels this [`Booking`] at the `now` moment.
    ///
    /// # Errors
    ///
    /// - If this [`Booking`] has been closed already.
    /// - If less than the `notice` period is left until the pickup day
    ///   starts.
    pub fn cancel(
        &mut self,
        now: CancellationDateTime,
        notice: Duration,
    ) -> Result<(), CancellationError> {
        if matches!(self.status, Status::Cancelled | Status::Completed) {
            return Err(CancellationError::AlreadyClosed(self.status));
        }

        let deadline = self.pickup_date().start_of_day() - notice;
        if now.coerce() > deadline {
            return Err(CancellationError::DeadlinePassed(deadline));
        }

        self.status = Status::Cancelled;
        _ = self.cancelled_at.replace(now);
        Ok(())
    }

    /// Records the handout of the booked [`Vehicle`].
    ///
    /// The [`Booking`] stays [`Status::Confirmed`] until the [`Vehicle`]
    /// comes back.
    ///
    /// # Errors
    ///
    /// - If this [`Booking`] is not a [`Status::Confirmed`] one.
    /// - If the [`Vehicle`] has been handed out already.
    pub fn record_checkout(
        &mut self,
        checkout: Checkout,
    ) -> Result<(), CheckoutError> {
        if self.status != Status::Confirmed {
            return Err(CheckoutError::NotConfirmed(self.status));
        }
        if self.checkout.is_some() {
            return Err(CheckoutError::AlreadyCheckedOut);
        }

        _ = self.checkout.replace(checkout);
        Ok(())
    }

    /// Records the return of the booked [`Vehicle`], completing this
    /// [`Booking`].
    ///
    /// # Errors
    ///
    /// - If the [`Vehicle`] has been returned already.
    /// - If the [`Vehicle`] has never been handed out.
    /// - If the returned odometer reading is below the one recorded at
    ///   handout.
    pub fn record_checkin(
        &mut self,
        checkin: Checkin,
    ) -> Result<(), CheckinError> {
        if self.checkin.is_some() {
            return Err(CheckinError::AlreadyCheckedIn);
        }
        let Some(checkout) = &self.checkout else {
            return Err(CheckinError::NotCheckedOut);
        };
        if checkin.mileage < checkout.mileage {
            return Err(CheckinError::OdometerBelowCheckout {
                checkout: checkout.mileage,
                checkin: checkin.mileage,
            });
        }

        self.status = Status::Completed;
        _ = self.checkin.replace(checkin);
        Ok(())
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Requested by a customer, but not confirmed yet."]
        Requested = 1,

        #[doc = "Confirmed, with the [`Vehicle`] reserved."]
        Confirmed = 2,

        #[doc = "Cancelled before pickup."]
        Cancelled = 3,

        #[doc = "Completed after the [`Vehicle`] came back."]
        Completed = 4,
    }
}

/// Extra services selected for a [`Booking`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Extras {
    /// Additional insurance coverage.
    pub insurance: bool,

    /// Additional driver allowed behind the wheel.
    pub additional_driver: bool,

    /// Child seat installed into the [`Vehicle`].
    pub child_seat: bool,
}

impl Extras {
    /// [`Extras`] with none of the services selected.
    pub const NONE: Self = Self {
        insurance: false,
        additional_driver: false,
        child_seat: false,
    };
}

/// Record of the booked [`Vehicle`] being handed out to the [`Customer`].
#[derive(Clone, Debug)]
pub struct Checkout {
    /// [`DateTime`] when the [`Vehicle`] was handed out.
    pub at: CheckoutDateTime,

    /// Odometer [`Mileage`] of the [`Vehicle`] at handout.
    pub mileage: Mileage,

    /// Free-form [`Notes`] on the condition of the [`Vehicle`] at handout.
    pub notes: Option<Notes>,
}

/// Record of the booked [`Vehicle`] coming back from the [`Customer`].
#[derive(Clone, Debug)]
pub struct Checkin {
    /// [`DateTime`] when the [`Vehicle`] came back.
    pub at: CheckinDateTime,

    /// Odometer [`Mileage`] of the [`Vehicle`] at return.
    pub mileage: Mileage,

    /// Indicator whether the [`Vehicle`] came back damaged.
    pub damage_present: bool,

    /// Free-form [`Notes`] describing the damage.
    pub damage_notes: Option<Notes>,

    /// Cost of repairing the damage, charged to the [`Customer`].
    pub damage_cost: Money,

    /// Fee for exceeding the mileage allowance of the booked period.
    pub excess_mileage_cost: Money,

    /// Fee for returning the [`Vehicle`] past the booked period.
    pub late_fee: Money,
}

/// Free-form notes attached to a [`Checkout`] or a [`Checkin`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` match the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        notes.trim() == notes && !notes.is_empty() && notes.len() <= 2048
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// Error of confirming a [`Booking`] that is not a requested one.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("`{_0}` booking cannot be confirmed")]
pub struct NotRequested(#[error(not(source))] pub Status);

/// Error of cancelling a [`Booking`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum CancellationError {
    /// [`Booking`] is in a terminal [`Status`] already.
    #[display("`{_0}` booking cannot be cancelled anymore")]
    AlreadyClosed(#[error(not(source))] Status),

    /// Notice period before pickup has run out.
    #[display("cancellation was only possible until {}", _0.to_rfc3339())]
    DeadlinePassed(#[error(not(source))] DateTime),
}

/// Error of recording a [`Checkout`] on a [`Booking`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum CheckoutError {
    /// [`Vehicle`] has been handed out already.
    #[display("booking has been checked out already")]
    AlreadyCheckedOut,

    /// [`Booking`] is not a confirmed one.
    #[display("`{_0}` booking cannot be checked out")]
    NotConfirmed(#[error(not(source))] Status),
}

/// Error of recording a [`Checkin`] on a [`Booking`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum CheckinError {
    /// [`Vehicle`] has come back already.
    #[display("booking has been checked in already")]
    AlreadyCheckedIn,

    /// [`Vehicle`] has never been handed out.
    #[display("booking must be checked out first")]
    NotCheckedOut,

    /// Returned odometer reading is below the one recorded at handout.
    #[display(
        "odometer reading {checkin} is below the checkout reading {checkout}"
    )]
    OdometerBelowCheckout {
        /// [`Mileage`] recorded at handout.
        checkout: Mileage,

        /// [`Mileage`] reported at return.
        checkin: Mileage,
    },
}

/// [`Booking`] to be persisted, with no [`Id`] assigned yet.
#[derive(Clone, Debug)]
pub struct New {
    /// ID of the [`Customer`] who books.
    pub customer_id: customer::Id,

    /// ID of the [`Vehicle`] being booked.
    pub vehicle_id: vehicle::Id,

    /// Period the [`Vehicle`] is booked for.
    pub period: DateRange,

    /// [`Location`] of the branch the [`Vehicle`] is picked up at.
    pub pickup_location: Location,

    /// [`Location`] of the branch the [`Vehicle`] is returned to.
    pub return_location: Location,

    /// Total price of the [`Booking`].
    pub total_price: Money,

    /// Part of the total price covering the selected [`Extras`].
    pub extras_cost: Money,

    /// [`Extras`] selected for the [`Booking`].
    pub extras: Extras,

    /// [`DateTime`] when the [`Booking`] was created.
    pub created_at: CreationDateTime,
}

impl New {
    /// Materializes this [`New`] booking under the given [`Id`].
    ///
    /// The [`Booking`] starts out as a [`Status::Requested`] one.
    #[must_use]
    pub fn with_id(self, id: Id) -> Booking {
        let Self {
            customer_id,
            vehicle_id,
            period,
            pickup_location,
            return_location,
            total_price,
            extras_cost,
            extras,
            created_at,
        } = self;

        Booking {
            id,
            customer_id,
            vehicle_id,
            period,
            pickup_location,
            return_location,
            status: Status::Requested,
            total_price,
            extras_cost,
            extras,
            checkout: None,
            checkin: None,
            cancelled_at: None,
            created_at,
        }
    }
}

/// Marker of a cancellation event.
#[derive(Clone, Copy, Debug)]
pub struct Cancellation;

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was cancelled.
pub type CancellationDateTime = DateTimeOf<(Booking, Cancellation)>;

/// [`DateTime`] when the [`Vehicle`] of a [`Booking`] was handed out.
pub type CheckoutDateTime = DateTimeOf<(Booking, Checkout)>;

/// [`DateTime`] when the [`Vehicle`] of a [`Booking`] came back.
pub type CheckinDateTime = DateTimeOf<(Booking, Checkin)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{Date, DateRange, Money};

    use super::{
        CancellationDateTime, CancellationError, Checkin, CheckinDateTime,
        CheckinError, Checkout, CheckoutDateTime, CheckoutError,
        CreationDateTime, Extras, NotRequested, Status,
    };

    fn booking() -> super::Booking {
        let period = DateRange::new(
            Date::from_ymd(2025, 6, 10).unwrap(),
            Date::from_ymd(2025, 6, 12).unwrap(),
        )
        .unwrap();

        super::New {
            customer_id: 1.into(),
            vehicle_id: 1.into(),
            period,
            pickup_location: "Lisbon Airport".parse().unwrap(),
            return_location: "Lisbon Airport".parse().unwrap(),
            total_price: "180".parse().unwrap(),
            extras_cost: Money::ZERO,
            extras: Extras::NONE,
            created_at: CreationDateTime::now(),
        }
        .with_id(1.into())
    }

    fn at(s: &str) -> CancellationDateTime {
        CancellationDateTime::from_rfc3339(s).unwrap()
    }

    fn checkout(mileage: u64) -> Checkout {
        Checkout {
            at: CheckoutDateTime::now(),
            mileage: mileage.into(),
            notes: None,
        }
    }

    fn checkin(mileage: u64) -> Checkin {
        Checkin {
            at: CheckinDateTime::now(),
            mileage: mileage.into(),
            damage_present: false,
            damage_notes: None,
            damage_cost: Money::ZERO,
            excess_mileage_cost: Money::ZERO,
            late_fee: Money::ZERO,
        }
    }

    const NOTICE: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn confirms_requested_only() {
        let mut b = booking();
        assert_eq!(b.status, Status::Requested);

        b.confirm().unwrap();
        assert_eq!(b.status, Status::Confirmed);

        assert_eq!(b.confirm(), Err(NotRequested(Status::Confirmed)));
    }

    #[test]
    fn cancels_before_notice_deadline() {
        let mut b = booking();

        b.cancel(at("2025-06-08T12:00:00Z"), NOTICE).unwrap();
        assert_eq!(b.status, Status::Cancelled);
        assert!(b.cancelled_at.is_some());
    }

    #[test]
    fn cancels_exactly_at_notice_deadline() {
        // Pickup on 2025-06-10, so the 24h notice runs out at
        // 2025-06-09T00:00:00Z sharp.
        let mut b = booking();

        b.cancel(at("2025-06-09T00:00:00Z"), NOTICE).unwrap();
        assert_eq!(b.status, Status::Cancelled);
    }

    #[test]
    fn refuses_cancelling_past_notice_deadline() {
        let mut b = booking();

        assert!(matches!(
            b.cancel(at("2025-06-09T12:00:00Z"), NOTICE),
            Err(CancellationError::DeadlinePassed(_)),
        ));
        assert_eq!(b.status, Status::Requested);
    }

    #[test]
    fn refuses_cancelling_closed() {
        let mut b = booking();
        b.confirm().unwrap();
        b.record_checkout(checkout(100)).unwrap();
        b.record_checkin(checkin(150)).unwrap();

        assert_eq!(
            b.cancel(at("2025-06-01T00:00:00Z"), NOTICE),
            Err(CancellationError::AlreadyClosed(Status::Completed)),
        );
    }

    #[test]
    fn checks_out_confirmed_once() {
        let mut b = booking();

        assert_eq!(
            b.record_checkout(checkout(100)),
            Err(CheckoutError::NotConfirmed(Status::Requested)),
        );

        b.confirm().unwrap();
        b.record_checkout(checkout(100)).unwrap();
        assert_eq!(b.status, Status::Confirmed);

        assert_eq!(
            b.record_checkout(checkout(100)),
            Err(CheckoutError::AlreadyCheckedOut),
        );
    }

    #[test]
    fn checks_in_after_checkout_only() {
        let mut b = booking();
        b.confirm().unwrap();

        assert_eq!(
            b.record_checkin(checkin(150)),
            Err(CheckinError::NotCheckedOut),
        );

        b.record_checkout(checkout(100)).unwrap();
        b.record_checkin(checkin(150)).unwrap();
        assert_eq!(b.status, Status::Completed);

        assert_eq!(
            b.record_checkin(checkin(160)),
            Err(CheckinError::AlreadyCheckedIn),
        );
    }

    #[test]
    fn refuses_checkin_below_checkout_mileage() {
        let mut b = booking();
        b.confirm().unwrap();
        b.record_checkout(checkout(100)).unwrap();

        assert_eq!(
            b.record_checkin(checkin(90)),
            Err(CheckinError::OdometerBelowCheckout {
                checkout: 100.into(),
                checkin: 90.into(),
            }),
        );
        assert_eq!(b.status, Status::Confirmed);
    }
}
