//! [`SearchAvailableVehicles`] definition.

use common::{
    operations::{By, Select},
    Date, DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        vehicle::{Category, Location},
        Vehicle,
    },
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] searching for [`Vehicle`]s open for booking over a period.
///
/// Matches available [`Vehicle`]s of the [`Category`] stationed at the
/// [`Location`] that have no confirmed booking overlapping the searched
/// period.
#[derive(Clone, Debug)]
pub struct SearchAvailableVehicles {
    /// [`Category`] the [`Vehicle`]s must be of.
    pub category: Category,

    /// [`Location`] of the branch to pick a [`Vehicle`] up at.
    pub location: Location,

    /// [`Date`] the rental would start on.
    pub pickup_date: Date,

    /// [`Date`] the rental would end on.
    pub return_date: Date,
}

impl<Db> Query<SearchAvailableVehicles> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Vehicle>, read::vehicle::Availability>>,
        Ok = Vec<Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: SearchAvailableVehicles,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SearchAvailableVehicles {
            category,
            location,
            pickup_date,
            return_date,
        } = query;

        if pickup_date < Date::today() {
            return Err(tracerr::new!(E::PickupInPast(pickup_date)));
        }
        let period = DateRange::new(pickup_date, return_date)
            .ok_or(E::ReturnBeforePickup { pickup_date, return_date })
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<Vec<Vehicle>, _>::new(
                read::vehicle::Availability { category, location, period },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SearchAvailableVehicles`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Searched pickup [`Date`] has already passed.
    #[display("pickup date {_0} has already passed")]
    PickupInPast(#[error(not(source))] Date),

    /// Searched return [`Date`] is before the pickup one.
    #[display("return date {return_date} is before pickup date {pickup_date}")]
    ReturnBeforePickup {
        /// Searched pickup [`Date`].
        pickup_date: Date,

        /// Searched return [`Date`].
        return_date: Date,
    },
}
