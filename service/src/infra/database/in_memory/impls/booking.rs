//! [`Booking`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{booking, customer, Booking},
    infra::{
        database::{self, in_memory::Store, InMemory},
        Database,
    },
    read::{self, booking::Waypoint},
};

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.view(|state| state.bookings.get(&id).cloned()).await)
    }
}

impl<C> Database<Select<By<Vec<Booking>, read::booking::Overlapping>>>
    for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::Overlapping>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::Overlapping {
            vehicle_id,
            period,
            status,
        } = by.into_inner();

        Ok(self
            .view(|state| {
                state
                    .bookings
                    .values()
                    .filter(|b| {
                        b.vehicle_id == vehicle_id
                            && b.status == status
                            && b.period.overlaps(&period)
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Booking>, read::booking::ScheduledFor>>>
    for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::ScheduledFor>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::ScheduledFor {
            date,
            waypoint,
            status,
        } = by.into_inner();

        Ok(self
            .view(|state| {
                state
                    .bookings
                    .values()
                    .filter(|b| {
                        b.status == status
                            && match waypoint {
                                Waypoint::Pickup => b.pickup_date() == date,
                                Waypoint::Return => b.return_date() == date,
                            }
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Booking>, customer::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let customer_id = by.into_inner();
        Ok(self
            .view(|state| {
                state
                    .bookings
                    .values()
                    .filter(|b| b.customer_id == customer_id)
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Booking>, ()>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Booking>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .view(|state| state.bookings.values().cloned().collect())
            .await)
    }
}

impl<C> Database<Insert<booking::New>> for InMemory<C>
where
    C: Store,
{
    type Ok = Booking;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<booking::New>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .apply(|state| {
                let booking = new.with_id(state.next_booking_id());
                _ = state.bookings.insert(booking.id, booking.clone());
                booking
            })
            .await)
    }
}

impl<C> Database<Update<Booking>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .apply(|state| {
                _ = state.bookings.insert(booking.id, booking);
            })
            .await)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let _: booking::Id = by.into_inner();

        // A transaction holds the whole `State` exclusively, so starting it
        // is all the locking there is.
        Ok(self.view(|_| ()).await)
    }
}
