//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{booking, vehicle, Vehicle},
    infra::{
        database::{self, in_memory::Store, InMemory},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.view(|state| state.vehicles.get(&id).cloned()).await)
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::LicensePlate>>>
    for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::LicensePlate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let plate = by.into_inner();
        Ok(self
            .view(|state| {
                state
                    .vehicles
                    .values()
                    .find(|v| v.license_plate == plate)
                    .cloned()
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::Availability>>>
    for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::Availability>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::vehicle::Availability {
            category,
            location,
            period,
        } = by.into_inner();

        Ok(self
            .view(|state| {
                state
                    .vehicles
                    .values()
                    .filter(|v| {
                        v.category == category
                            && v.location.matches(&location)
                            && v.is_available()
                            && !state.bookings.values().any(|b| {
                                b.vehicle_id == v.id
                                    && b.status == booking::Status::Confirmed
                                    && b.period.overlaps(&period)
                            })
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, ()>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Vehicle>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .view(|state| state.vehicles.values().cloned().collect())
            .await)
    }
}

impl<C> Database<Insert<vehicle::New>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vehicle;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<vehicle::New>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .apply(|state| {
                let vehicle = new.with_id(state.next_vehicle_id());
                _ = state.vehicles.insert(vehicle.id, vehicle.clone());
                vehicle
            })
            .await)
    }
}

impl<C> Database<Update<Vehicle>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .apply(|state| {
                _ = state.vehicles.insert(vehicle.id, vehicle);
            })
            .await)
    }
}

impl<C> Database<Lock<By<Vehicle, vehicle::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let _: vehicle::Id = by.into_inner();

        // A transaction holds the whole `State` exclusively, so starting it
        // is all the locking there is.
        Ok(self.view(|_| ()).await)
    }
}
