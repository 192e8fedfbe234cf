//! [`Query`] collection related to [`Vehicle`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::domain::{vehicle, Vehicle};

use super::DatabaseQuery;

/// Queries a [`Vehicle`] by its [`vehicle::Id`].
pub type ById = DatabaseQuery<By<Option<Vehicle>, vehicle::Id>>;

/// Queries a [`Vehicle`] by its [`vehicle::LicensePlate`].
pub type ByPlate = DatabaseQuery<By<Option<Vehicle>, vehicle::LicensePlate>>;

/// Queries all [`Vehicle`]s of the fleet.
pub type All = DatabaseQuery<By<Vec<Vehicle>, ()>>;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{vehicle, Vehicle},
        infra::{database::InMemory, Database as _},
        Config, Service,
    };

    use super::{All, ByPlate};

    fn service(db: &InMemory) -> Service<InMemory> {
        Service::new(Config::default(), db.clone())
    }

    async fn seed_vehicle(db: &InMemory, plate: &str) -> Vehicle {
        db.execute(Insert(vehicle::New {
            license_plate: plate.parse().unwrap(),
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
    async fn finds_vehicle_by_plate_ignoring_case() {
        let db = InMemory::new();
        let vehicle = seed_vehicle(&db, "AB-123-CD").await;
        _ = seed_vehicle(&db, "EF-456-GH").await;

        let found = service(&db)
            .execute(ByPlate::by("ab-123-cd".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(found.map(|v| v.id), Some(vehicle.id));

        let missing = service(&db)
            .execute(ByPlate::by("ZZ-999-ZZ".parse().unwrap()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn lists_whole_fleet() {
        let db = InMemory::new();
        let first = seed_vehicle(&db, "AB-123-CD").await;
        let second = seed_vehicle(&db, "EF-456-GH").await;

        let fleet = service(&db).execute(All::by(())).await.unwrap();
        assert_eq!(
            fleet.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![first.id, second.id],
        );
    }
}
