//! [`Command`] for recording the return of a booked [`Vehicle`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking, pricing,
        vehicle::{self, Mileage},
        Booking, Vehicle,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording the return of a booked [`Vehicle`], completing
/// the [`Booking`].
///
/// Settles the return charges: excess mileage beyond the booked allowance,
/// a late fee for every day past the booked period, and the cost of any
/// damage found on the [`Vehicle`].
#[derive(Clone, Debug)]
pub struct CheckinVehicle {
    /// ID of the [`Booking`] being checked in.
    pub booking_id: booking::Id,

    /// Odometer [`Mileage`] of the [`Vehicle`] at return.
    pub mileage: Mileage,

    /// Indicator whether the [`Vehicle`] came back damaged.
    pub damage_present: bool,

    /// Free-form [`booking::Notes`] describing the damage.
    pub damage_notes: Option<booking::Notes>,

    /// Cost of repairing the damage, charged when `damage_present` is set.
    pub damage_cost: Money,

    /// Moment the [`Vehicle`] actually came back at.
    pub actual_return_at: booking::CheckinDateTime,
}

impl<Db> Command<CheckinVehicle> for Service<Db>
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
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CheckinVehicle,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckinVehicle {
            booking_id,
            mileage,
            damage_present,
            damage_notes,
            damage_cost,
            actual_return_at,
        } = cmd;

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
        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(booking.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(booking.vehicle_id))
            .map_err(tracerr::wrap!())?;

        let excess_mileage_cost = pricing::excess_mileage_cost(
            booking.period.days(),
            booking.checkout.as_ref().map(|c| c.mileage),
            Some(mileage),
        );
        let late_fee = pricing::late_fee(
            Some(booking.return_date()),
            Some(actual_return_at.coerce()),
        );
        let damage_cost =
            if damage_present { damage_cost } else { Money::ZERO };

        booking
            .record_checkin(booking::Checkin {
                at: actual_return_at,
                mileage,
                damage_present,
                damage_notes,
                damage_cost,
                excess_mileage_cost,
                late_fee,
            })
            .map_err(tracerr::from_and_wrap!(=> E))?;

        vehicle.record_mileage(mileage);
        vehicle.mark_available().map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(vehicle))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Booking(id: {})` completed", booking.id);

        Ok(booking)
    }
}

/// Error of [`CheckinVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Reported odometer reading is zero.
    #[display("odometer reading must be positive")]
    MileageNotPositive,

    /// [`Booking`] cannot be checked in.
    #[display("cannot check in the booking: {_0}")]
    #[from]
    NotCheckinable(booking::CheckinError),

    /// Booked [`Vehicle`] does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] cannot be released back into the fleet.
    #[display("vehicle cannot be released: {_0}")]
    #[from]
    VehicleNotReleasable(vehicle::StatusError),
}
