//! [`Command`] for adding a [`Vehicle`] to the fleet.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        audit,
        vehicle::{
            self, Brand, Category, LicensePlate, Location, Mileage, Model,
            ModelYear,
        },
        Vehicle,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a new [`Vehicle`] to the fleet.
///
/// The added [`Vehicle`] starts out available for rentals.
#[derive(Clone, Debug)]
pub struct AddVehicle {
    /// [`LicensePlate`] of the [`Vehicle`].
    pub license_plate: LicensePlate,

    /// [`Brand`] of the [`Vehicle`].
    pub brand: Brand,

    /// [`Model`] of the [`Vehicle`].
    pub model: Model,

    /// [`Category`] of the [`Vehicle`].
    pub category: Category,

    /// [`ModelYear`] of the [`Vehicle`].
    pub year: ModelYear,

    /// Odometer [`Mileage`] of the [`Vehicle`].
    pub mileage: Mileage,

    /// [`Location`] of the branch the [`Vehicle`] is stationed at.
    pub location: Location,

    /// Price of renting the [`Vehicle`] out for one day.
    pub daily_price: Money,

    /// [`audit::Actor`] who adds the [`Vehicle`].
    pub actor: audit::Actor,

    /// [`audit::Origin`] the action comes from, if known.
    pub origin: Option<audit::Origin>,
}

impl<Db> Command<AddVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Vehicle>, LicensePlate>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<vehicle::New>,
            Ok = Vehicle,
            Err = Traced<database::Error>,
        > + Database<Insert<audit::New>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddVehicle {
            license_plate,
            brand,
            model,
            category,
            year,
            mileage,
            location,
            daily_price,
            actor,
            origin,
        } = cmd;

        if !daily_price.is_positive() {
            return Err(tracerr::new!(E::PriceNotPositive(daily_price)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // A `LicensePlate` identifies a `Vehicle` uniquely within the fleet.
        let existing = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(
                license_plate.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::PlateAlreadyUsed(license_plate)));
        }

        let vehicle = tx
            .execute(Insert(vehicle::New {
                license_plate,
                brand,
                model,
                category,
                year,
                mileage,
                location,
                daily_price,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(audit::New {
            actor,
            action: audit::Action::VehicleAdded,
            subject: vehicle.id.into(),
            detail: format!(
                "Vehicle {} added to the fleet",
                vehicle.license_plate,
            )
            .into(),
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

        log::info!("`Vehicle(id: {})` added to the fleet", vehicle.id);

        Ok(vehicle)
    }
}

/// Error of [`AddVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Another [`Vehicle`] carries the provided [`LicensePlate`] already.
    #[display("vehicle with license plate {_0} exists already")]
    PlateAlreadyUsed(#[error(not(source))] LicensePlate),

    /// Provided daily price is zero or negative.
    #[display("daily price {_0} is not positive")]
    PriceNotPositive(#[error(not(source))] Money),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{audit, vehicle, Vehicle},
        infra::{database::InMemory, Database as _},
        Config, Service,
    };

    use super::{AddVehicle, ExecutionError};

    fn service(db: &InMemory) -> Service<InMemory> {
        Service::new(Config::default(), db.clone())
    }

    fn cmd(plate: &str, price: &str) -> AddVehicle {
        AddVehicle {
            license_plate: plate.parse().unwrap(),
            brand: "Toyota".parse().unwrap(),
            model: "Corolla".parse().unwrap(),
            category: vehicle::Category::Midsize,
            year: 2022,
            mileage: 10_000.into(),
            location: "Lisbon Airport".parse().unwrap(),
            daily_price: price.parse().unwrap(),
            actor: "fleet-manager".parse().unwrap(),
            origin: Some("back-office".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn adds_available_vehicle() {
        let db = InMemory::new();

        let vehicle = service(&db)
            .execute(cmd("AB-123-CD", "60"))
            .await
            .unwrap();
        assert_eq!(vehicle.status, vehicle::Status::Available);

        let stored = db
            .execute(Select(By::<Option<Vehicle>, _>::new(
                vehicle.license_plate.clone(),
            )))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, vehicle.id);

        let trail = db
            .execute(Select(By::<Vec<audit::Entry>, _>::new(
                audit::Subject::from(vehicle.id),
            )))
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, audit::Action::VehicleAdded);
    }

    #[tokio::test]
    async fn rejects_duplicate_plate() {
        let db = InMemory::new();

        service(&db).execute(cmd("AB-123-CD", "60")).await.unwrap();
        // Plates are normalized to uppercase, so the letter case doesn't
        // matter for uniqueness.
        let err = service(&db)
            .execute(cmd("ab-123-cd", "45"))
            .await
            .unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(matches!(err, ExecutionError::PlateAlreadyUsed(_)), "{err}");
    }

    #[tokio::test]
    async fn rejects_non_positive_price() {
        let db = InMemory::new();

        for price in ["0", "-10"] {
            let err = service(&db)
                .execute(cmd("AB-123-CD", price))
                .await
                .unwrap_err();

            let err: &ExecutionError = err.as_ref();
            assert!(
                matches!(err, ExecutionError::PriceNotPositive(_)),
                "{err}",
            );
        }
    }
}
