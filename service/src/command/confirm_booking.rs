//! [`Command`] for confirming a requested [`Booking`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{audit, booking, vehicle, Booking, Vehicle},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for confirming a requested [`Booking`].
///
/// Confirming reserves the booked [`Vehicle`], so no other [`Booking`] can
/// claim it for an overlapping period.
#[derive(Clone, Debug)]
pub struct ConfirmBooking {
    /// ID of the [`Booking`] to confirm.
    pub booking_id: booking::Id,

    /// [`audit::Actor`] who confirms the [`Booking`].
    pub actor: audit::Actor,

    /// [`audit::Origin`] the action comes from, if known.
    pub origin: Option<audit::Origin>,
}

impl<Db> Command<ConfirmBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, read::booking::Overlapping>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<Insert<audit::New>, Err = Traced<database::Error>>
        + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ConfirmBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmBooking { booking_id, actor, origin } = cmd;

        // Resolve the booked `Vehicle` to lock it before the `Booking`.
        let vehicle_id = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?
            .vehicle_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Vehicle`.
        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(booking.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(booking.vehicle_id))
            .map_err(tracerr::wrap!())?;

        // The local transition is not visible to the availability check until
        // the `Booking` is updated.
        booking.confirm().map_err(tracerr::from_and_wrap!(=> E))?;

        // Another `Booking` could have claimed the `Vehicle` since this one
        // was requested.
        let overlapping = tx
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::Overlapping::confirmed(
                    booking.vehicle_id,
                    booking.period,
                ),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !overlapping.is_empty() {
            return Err(tracerr::new!(E::VehicleUnavailable(
                booking.vehicle_id,
            )));
        }

        vehicle.mark_rented().map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(vehicle))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::New {
            actor,
            action: audit::Action::BookingConfirmed,
            subject: booking.id.into(),
            detail: "Booking confirmed".into(),
            origin,
            recorded_at: audit::RecordingDateTime::now(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Booking(id: {})` confirmed", booking.id);

        Ok(booking)
    }
}

/// Error of [`ConfirmBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] is not a requested one.
    #[display("cannot confirm the booking: {_0}")]
    #[from]
    NotConfirmable(booking::NotRequested),

    /// Booked [`Vehicle`] does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] cannot be reserved.
    #[display("vehicle cannot be reserved: {_0}")]
    #[from]
    VehicleNotRentable(vehicle::StatusError),

    /// [`Vehicle`] is booked for an overlapping period already.
    #[display("`Vehicle(id: {_0})` is unavailable for the booked period")]
    VehicleUnavailable(#[error(not(source))] vehicle::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        Date, DateRange, Money,
    };

    use crate::{
        domain::{audit, booking, customer, vehicle, Booking, Vehicle},
        infra::{database::InMemory, Database as _},
        Config, Service,
    };

    use super::{ConfirmBooking, ExecutionError};

    fn service(db: &InMemory) -> Service<InMemory> {
        Service::new(Config::default(), db.clone())
    }

    fn cmd(booking_id: booking::Id) -> ConfirmBooking {
        ConfirmBooking {
            booking_id,
            actor: "front-desk".parse().unwrap(),
            origin: Some("test".parse().unwrap()),
        }
    }

    async fn seed_customer(db: &InMemory) -> customer::Id {
        db.execute(Insert(customer::New {
            first_name: "Ada".parse().unwrap(),
            last_name: "Lovelace".parse().unwrap(),
        }))
        .await
        .unwrap()
        .id
    }

    async fn seed_vehicle(db: &InMemory) -> Vehicle {
        db.execute(Insert(vehicle::New {
            license_plate: "AB-123-CD".parse().unwrap(),
            brand: "Toyota".parse().unwrap(),
            model: "Corolla".parse().unwrap(),
            category: vehicle::Category::Midsize,
            year: 2022,
            mileage: 10_000.into(),
            location: "Lisbon Airport".parse().unwrap(),
            daily_price: "60".parse().unwrap(),
        }))
        .await
        .unwrap()
    }

    async fn seed_requested(
        db: &InMemory,
        customer_id: customer::Id,
        vehicle_id: vehicle::Id,
        from_days: i64,
        to_days: i64,
    ) -> Booking {
        let period = DateRange::new(
            Date::today().plus_days(from_days).unwrap(),
            Date::today().plus_days(to_days).unwrap(),
        )
        .unwrap();

        db.execute(Insert(booking::New {
            customer_id,
            vehicle_id,
            period,
            pickup_location: "Lisbon Airport".parse().unwrap(),
            return_location: "Lisbon Airport".parse().unwrap(),
            total_price: "180".parse().unwrap(),
            extras_cost: Money::ZERO,
            extras: booking::Extras::NONE,
            created_at: booking::CreationDateTime::now(),
        }))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn confirms_requested_booking() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let booking =
            seed_requested(&db, customer_id, vehicle.id, 7, 9).await;

        let confirmed =
            service(&db).execute(cmd(booking.id)).await.unwrap();
        assert_eq!(confirmed.status, booking::Status::Confirmed);

        let stored = db
            .execute(Select(By::<Option<Booking>, _>::new(booking.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().status, booking::Status::Confirmed);

        let vehicle = db
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle.id)))
            .await
            .unwrap();
        assert_eq!(vehicle.unwrap().status, vehicle::Status::Rented);

        let trail = db
            .execute(Select(By::<Vec<audit::Entry>, _>::new(
                audit::Subject::from(booking.id),
            )))
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, audit::Action::BookingConfirmed);
    }

    #[tokio::test]
    async fn rejects_missing_booking() {
        let db = InMemory::new();

        let err = service(&db).execute(cmd(404.into())).await.unwrap_err();
        let err: &ExecutionError = err.as_ref();
        assert!(matches!(err, ExecutionError::BookingNotExists(_)), "{err}");
    }

    #[tokio::test]
    async fn rejects_confirmed_booking() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let booking =
            seed_requested(&db, customer_id, vehicle.id, 7, 9).await;

        service(&db).execute(cmd(booking.id)).await.unwrap();
        let err = service(&db).execute(cmd(booking.id)).await.unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(matches!(err, ExecutionError::NotConfirmable(_)), "{err}");
    }

    #[tokio::test]
    async fn rejects_overlapping_confirmed_booking() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let first =
            seed_requested(&db, customer_id, vehicle.id, 7, 9).await;
        let second =
            seed_requested(&db, customer_id, vehicle.id, 8, 10).await;

        service(&db).execute(cmd(first.id)).await.unwrap();
        let err = service(&db).execute(cmd(second.id)).await.unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(
            matches!(err, ExecutionError::VehicleUnavailable(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_vehicle_rented_for_disjoint_period() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let first =
            seed_requested(&db, customer_id, vehicle.id, 7, 9).await;
        let second =
            seed_requested(&db, customer_id, vehicle.id, 20, 22).await;

        service(&db).execute(cmd(first.id)).await.unwrap();
        let err = service(&db).execute(cmd(second.id)).await.unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(
            matches!(err, ExecutionError::VehicleNotRentable(_)),
            "{err}",
        );
    }
}
