//! [`Command`] for recording the handout of a booked [`Vehicle`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        audit, booking,
        vehicle::{self, Mileage},
        Booking, Vehicle,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording the handout of a booked [`Vehicle`] to the
/// customer.
///
/// The [`Booking`] stays confirmed until the [`Vehicle`] comes back.
#[derive(Clone, Debug)]
pub struct CheckoutVehicle {
    /// ID of the [`Booking`] being checked out.
    pub booking_id: booking::Id,

    /// Odometer [`Mileage`] of the [`Vehicle`] at handout.
    pub mileage: Mileage,

    /// Free-form [`booking::Notes`] on the condition of the [`Vehicle`].
    pub notes: Option<booking::Notes>,

    /// [`audit::Actor`] who hands the [`Vehicle`] out.
    pub actor: audit::Actor,
}

impl<Db> Command<CheckoutVehicle> for Service<Db>
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
        > + Database<Insert<audit::New>, Err = Traced<database::Error>>
        + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CheckoutVehicle,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckoutVehicle { booking_id, mileage, notes, actor } = cmd;

        if mileage == Mileage::ZERO {
            return Err(tracerr::new!(E::MileageNotPositive));
        }

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

        // Avoid concurrent actions upon the same `Vehicle` and `Booking`.
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

        booking
            .record_checkout(booking::Checkout {
                at: booking::CheckoutDateTime::now(),
                mileage,
                notes,
            })
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(booking.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(booking.vehicle_id))
            .map_err(tracerr::wrap!())?;

        // An odometer cannot run backwards.
        if mileage < vehicle.mileage {
            return Err(tracerr::new!(E::MileageBelowRecorded {
                recorded: vehicle.mileage,
                reported: mileage,
            }));
        }
        vehicle.record_mileage(mileage);

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::New {
            actor,
            action: audit::Action::BookingCheckedOut,
            subject: booking.id.into(),
            detail: format!("Vehicle {} handed out", vehicle.license_plate)
                .into(),
            origin: None,
            recorded_at: audit::RecordingDateTime::now(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Booking(id: {})` checked out", booking.id);

        Ok(booking)
    }
}

/// Error of [`CheckoutVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Reported odometer reading is below the recorded one.
    #[display(
        "odometer reading {reported} is below the vehicle's recorded \
         {recorded}"
    )]
    MileageBelowRecorded {
        /// [`Mileage`] recorded on the [`Vehicle`].
        recorded: Mileage,

        /// [`Mileage`] reported at handout.
        reported: Mileage,
    },

    /// Reported odometer reading is zero.
    #[display("odometer reading must be positive")]
    MileageNotPositive,

    /// [`Booking`] cannot be checked out.
    #[display("cannot check out the booking: {_0}")]
    #[from]
    NotCheckoutable(booking::CheckoutError),

    /// Booked [`Vehicle`] does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
