//! Storage primitives of the [`InMemory`] database.

use std::{collections::BTreeMap, future::Future};

use crate::domain::{
    audit, booking, customer, vehicle, Booking, Customer, Vehicle,
};

#[cfg(doc)]
use super::InMemory;

/// Whole dataset of an [`InMemory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// All the stored [`Vehicle`]s, keyed by their [`vehicle::Id`].
    pub vehicles: BTreeMap<vehicle::Id, Vehicle>,

    /// All the stored [`Booking`]s, keyed by their [`booking::Id`].
    pub bookings: BTreeMap<booking::Id, Booking>,

    /// All the stored [`Customer`]s, keyed by their [`customer::Id`].
    pub customers: BTreeMap<customer::Id, Customer>,

    /// Append-only log of the recorded [`audit::Entry`]s.
    pub audit_log: Vec<audit::Entry>,

    /// Last issued [`vehicle::Id`].
    last_vehicle_id: i64,

    /// Last issued [`booking::Id`].
    last_booking_id: i64,

    /// Last issued [`customer::Id`].
    last_customer_id: i64,

    /// Last issued [`audit::Id`].
    last_audit_id: i64,
}

impl State {
    /// Issues the next free [`vehicle::Id`].
    pub fn next_vehicle_id(&mut self) -> vehicle::Id {
        self.last_vehicle_id += 1;
        self.last_vehicle_id.into()
    }

    /// Issues the next free [`booking::Id`].
    pub fn next_booking_id(&mut self) -> booking::Id {
        self.last_booking_id += 1;
        self.last_booking_id.into()
    }

    /// Issues the next free [`customer::Id`].
    pub fn next_customer_id(&mut self) -> customer::Id {
        self.last_customer_id += 1;
        self.last_customer_id.into()
    }

    /// Issues the next free [`audit::Id`].
    pub fn next_audit_id(&mut self) -> audit::Id {
        self.last_audit_id += 1;
        self.last_audit_id.into()
    }
}

/// Access to the [`State`] of an [`InMemory`] database.
pub trait Store {
    /// Runs the provided function over the current [`State`].
    fn view<R>(&self, f: impl FnOnce(&State) -> R) -> impl Future<Output = R>;

    /// Runs the provided function over the current [`State`], mutating it
    /// in place.
    fn apply<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = R>;
}
