//! [`Command`] for withdrawing a [`Vehicle`] from the fleet.

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{audit, vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for withdrawing a [`Vehicle`] from the fleet.
///
/// Withdrawal is terminal: an out-of-service [`Vehicle`] never comes back
/// into rotation.
#[derive(Clone, Debug)]
pub struct SetVehicleOutOfService {
    /// ID of the [`Vehicle`] to withdraw.
    pub vehicle_id: vehicle::Id,

    /// [`audit::Actor`] who withdraws the [`Vehicle`].
    pub actor: audit::Actor,

    /// [`audit::Origin`] the action comes from, if known.
    pub origin: Option<audit::Origin>,
}

impl<Db> Command<SetVehicleOutOfService> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Insert<audit::New>, Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetVehicleOutOfService,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetVehicleOutOfService { vehicle_id, actor, origin } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Vehicle`.
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

        vehicle
            .mark_out_of_service()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Update(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Insert(audit::New {
            actor,
            action: audit::Action::VehicleOutOfService,
            subject: vehicle.id.into(),
            detail: format!(
                "Vehicle {} withdrawn from service",
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

        log::info!("`Vehicle(id: {})` withdrawn from service", vehicle.id);

        Ok(vehicle)
    }
}

/// Error of [`SetVehicleOutOfService`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] cannot be withdrawn from the fleet.
    #[display("vehicle cannot be withdrawn: {_0}")]
    #[from]
    NotWithdrawable(vehicle::StatusError),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select, Update};

    use crate::{
        domain::{audit, vehicle, Vehicle},
        infra::{database::InMemory, Database as _},
        Config, Service,
    };

    use super::{ExecutionError, SetVehicleOutOfService};

    fn service(db: &InMemory) -> Service<InMemory> {
        Service::new(Config::default(), db.clone())
    }

    fn cmd(vehicle_id: vehicle::Id) -> SetVehicleOutOfService {
        SetVehicleOutOfService {
            vehicle_id,
            actor: "fleet-manager".parse().unwrap(),
            origin: None,
        }
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

    #[tokio::test]
    async fn withdraws_available_vehicle() {
        let db = InMemory::new();
        let vehicle = seed_vehicle(&db).await;

        let withdrawn = service(&db).execute(cmd(vehicle.id)).await.unwrap();
        assert_eq!(withdrawn.status, vehicle::Status::OutOfService);

        let stored = db
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, vehicle::Status::OutOfService);

        let trail = db
            .execute(Select(By::<Vec<audit::Entry>, _>::new(
                audit::Subject::from(vehicle.id),
            )))
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, audit::Action::VehicleOutOfService);
    }

    #[tokio::test]
    async fn rejects_rented_vehicle() {
        let db = InMemory::new();
        let mut vehicle = seed_vehicle(&db).await;
        vehicle.mark_rented().unwrap();
        db.execute(Update(vehicle.clone())).await.unwrap();

        let err = service(&db).execute(cmd(vehicle.id)).await.unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(matches!(err, ExecutionError::NotWithdrawable(_)), "{err}");
    }

    #[tokio::test]
    async fn rejects_missing_vehicle() {
        let db = InMemory::new();

        let err = service(&db).execute(cmd(404.into())).await.unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(matches!(err, ExecutionError::VehicleNotExists(_)), "{err}");
    }
}
