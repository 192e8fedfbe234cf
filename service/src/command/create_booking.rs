//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    Date, DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        audit, booking, customer, pricing,
        vehicle::{self, Location},
        Booking, Customer, Vehicle,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Booking`].
///
/// The created [`Booking`] is confirmed right away, reserving the
/// [`Vehicle`] for the booked period.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`Customer`] who books.
    pub customer_id: customer::Id,

    /// ID of the [`Vehicle`] being booked.
    pub vehicle_id: vehicle::Id,

    /// [`Date`] the [`Vehicle`] is to be picked up on.
    pub pickup_date: Date,

    /// [`Date`] the [`Vehicle`] is to be returned on.
    pub return_date: Date,

    /// [`Location`] of the branch the [`Vehicle`] is picked up at.
    pub pickup_location: Location,

    /// [`Location`] of the branch the [`Vehicle`] is returned to.
    pub return_location: Location,

    /// [`booking::Extras`] selected for the [`Booking`].
    pub extras: booking::Extras,

    /// [`audit::Actor`] who creates the [`Booking`].
    pub actor: audit::Actor,

    /// [`audit::Origin`] the action comes from, if known.
    pub origin: Option<audit::Origin>,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, read::booking::Overlapping>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<booking::New>,
            Ok = Booking,
            Err = Traced<database::Error>,
        > + Database<Insert<audit::New>, Err = Traced<database::Error>>
        + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            customer_id,
            vehicle_id,
            pickup_date,
            return_date,
            pickup_location,
            return_location,
            extras,
            actor,
            origin,
        } = cmd;

        if pickup_date < Date::today() {
            return Err(tracerr::new!(E::PickupInPast(pickup_date)));
        }
        let period = DateRange::new(pickup_date, return_date)
            .ok_or(E::ReturnBeforePickup { pickup_date, return_date })
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

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

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        let overlapping = tx
            .execute(Select(By::<Vec<Booking>, _>::new(
                read::booking::Overlapping::confirmed(vehicle_id, period),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !overlapping.is_empty() {
            return Err(tracerr::new!(E::VehicleUnavailable(vehicle_id)));
        }

        let base_price =
            pricing::base_price(vehicle.category, pickup_date, return_date)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        let extras_cost = pricing::extras_cost(period.days(), extras)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut booking = tx
            .execute(Insert(booking::New {
                customer_id,
                vehicle_id,
                period,
                pickup_location,
                return_location,
                total_price: base_price + extras_cost,
                extras_cost,
                extras,
                created_at: booking::CreationDateTime::now(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(audit::New {
            actor: actor.clone(),
            action: audit::Action::BookingCreated,
            subject: booking.id.into(),
            detail: format!(
                "Booking created for vehicle {}",
                vehicle.license_plate,
            )
            .into(),
            origin: origin.clone(),
            recorded_at: audit::RecordingDateTime::now(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        booking.confirm().map_err(tracerr::from_and_wrap!(=> E))?;
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
            detail: "Booking confirmed automatically".into(),
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

        log::info!("`Booking(id: {})` created and confirmed", booking.id);

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Booked period doesn't cover a single day.
    #[display("invalid rental period: {_0}")]
    #[from]
    InvalidPeriod(pricing::InvalidRange),

    /// Created [`Booking`] cannot be confirmed.
    #[display("cannot confirm the created booking: {_0}")]
    #[from]
    NotConfirmable(booking::NotRequested),

    /// Provided pickup [`Date`] has already passed.
    #[display("pickup date {_0} has already passed")]
    PickupInPast(#[error(not(source))] Date),

    /// Provided return [`Date`] is before the pickup one.
    #[display("return date {return_date} is before pickup date {pickup_date}")]
    ReturnBeforePickup {
        /// Provided pickup [`Date`].
        pickup_date: Date,

        /// Provided return [`Date`].
        return_date: Date,
    },

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] cannot be reserved.
    #[display("vehicle cannot be reserved: {_0}")]
    #[from]
    VehicleNotRentable(vehicle::StatusError),

    /// [`Vehicle`] is booked for an overlapping period already.
    #[display("`Vehicle(id: {_0})` is unavailable for the chosen period")]
    VehicleUnavailable(#[error(not(source))] vehicle::Id),
}
