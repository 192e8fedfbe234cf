//! [`Query`] collection related to [`Booking`]s.

use common::operations::By;

#[cfg(doc)]
use common::Date;

#[cfg(doc)]
use crate::{domain::Customer, Query};
use crate::{
    domain::{booking, customer, Booking},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Booking`] by its [`booking::Id`].
pub type ById = DatabaseQuery<By<Option<Booking>, booking::Id>>;

/// Queries [`Booking`]s scheduled to touch a branch on a single [`Date`].
///
/// The [`read::booking::ScheduledFor`] selector names the day and the side of
/// the rental falling on it: [`pickups()`], [`returns()`] and [`requests()`]
/// cover the operational views of the day.
///
/// [`pickups()`]: read::booking::ScheduledFor::pickups
/// [`requests()`]: read::booking::ScheduledFor::requests
/// [`returns()`]: read::booking::ScheduledFor::returns
pub type Scheduled =
    DatabaseQuery<By<Vec<Booking>, read::booking::ScheduledFor>>;

/// Queries all the [`Booking`]s ever made by a [`Customer`].
pub type History = DatabaseQuery<By<Vec<Booking>, customer::Id>>;

/// Queries all [`Booking`]s.
pub type All = DatabaseQuery<By<Vec<Booking>, ()>>;

#[cfg(test)]
mod spec {
    use common::{
        operations::{Insert, Update},
        Date, DateRange, Money,
    };

    use crate::{
        domain::{booking, customer, vehicle, Booking, Vehicle},
        infra::{database::InMemory, Database as _},
        read,
        Config, Service,
    };

    use super::{All, ById, History, Scheduled};

    fn service(db: &InMemory) -> Service<InMemory> {
        Service::new(Config::default(), db.clone())
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

    async fn confirm(db: &InMemory, mut booking: Booking) -> Booking {
        booking.confirm().unwrap();
        db.execute(Update(booking.clone())).await.unwrap();
        booking
    }

    fn ids(bookings: &[Booking]) -> Vec<booking::Id> {
        bookings.iter().map(|b| b.id).collect()
    }

    #[tokio::test]
    async fn selects_day_schedule_by_waypoint_and_status() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let requested =
            seed_requested(&db, customer_id, vehicle.id, 2, 4).await;
        let confirmed =
            seed_requested(&db, customer_id, vehicle.id, 2, 4).await;
        let confirmed = confirm(&db, confirmed).await;
        // Off-schedule noise the day views must not pick up.
        _ = seed_requested(&db, customer_id, vehicle.id, 5, 6).await;

        let pickup_date = Date::today().plus_days(2).unwrap();
        let return_date = Date::today().plus_days(4).unwrap();

        let pickups = service(&db)
            .execute(Scheduled::by(read::booking::ScheduledFor::pickups(
                pickup_date,
            )))
            .await
            .unwrap();
        assert_eq!(ids(&pickups), vec![confirmed.id]);

        let returns = service(&db)
            .execute(Scheduled::by(read::booking::ScheduledFor::returns(
                return_date,
            )))
            .await
            .unwrap();
        assert_eq!(ids(&returns), vec![confirmed.id]);

        let requests = service(&db)
            .execute(Scheduled::by(read::booking::ScheduledFor::requests(
                pickup_date,
            )))
            .await
            .unwrap();
        assert_eq!(ids(&requests), vec![requested.id]);
    }

    #[tokio::test]
    async fn lists_customer_history() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let other_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let first = seed_requested(&db, customer_id, vehicle.id, 2, 4).await;
        let second = seed_requested(&db, customer_id, vehicle.id, 6, 8).await;
        let foreign = seed_requested(&db, other_id, vehicle.id, 2, 4).await;

        let history =
            service(&db).execute(History::by(customer_id)).await.unwrap();
        assert_eq!(ids(&history), vec![first.id, second.id]);

        let all = service(&db).execute(All::by(())).await.unwrap();
        assert_eq!(ids(&all), vec![first.id, second.id, foreign.id]);
    }

    #[tokio::test]
    async fn finds_booking_by_id() {
        let db = InMemory::new();
        let customer_id = seed_customer(&db).await;
        let vehicle = seed_vehicle(&db).await;
        let booking =
            seed_requested(&db, customer_id, vehicle.id, 2, 4).await;

        let found =
            service(&db).execute(ById::by(booking.id)).await.unwrap();
        assert_eq!(found.map(|b| b.id), Some(booking.id));

        let missing =
            service(&db).execute(ById::by(404.into())).await.unwrap();
        assert!(missing.is_none());
    }
}
