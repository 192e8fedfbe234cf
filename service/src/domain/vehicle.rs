//! [`Vehicle`] definitions.

use std::sync::LazyLock;

use common::{define_kind, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Vehicle of the rental fleet.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// [`LicensePlate`] of this [`Vehicle`].
    pub license_plate: LicensePlate,

    /// [`Brand`] of this [`Vehicle`].
    pub brand: Brand,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// [`Category`] of this [`Vehicle`].
    pub category: Category,

    /// [`ModelYear`] of this [`Vehicle`].
    pub year: ModelYear,

    /// Odometer [`Mileage`] of this [`Vehicle`].
    pub mileage: Mileage,

    /// [`Location`] of the branch this [`Vehicle`] is stationed at.
    pub location: Location,

    /// Price of renting this [`Vehicle`] out for one day.
    pub daily_price: Money,

    /// [`Status`] of this [`Vehicle`].
    pub status: Status,
}

impl Vehicle {
    /// Indicates whether this [`Vehicle`] can be handed out for a rental.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == Status::Available
    }

    /// Transitions this [`Vehicle`] to the [`Status::Rented`].
    ///
    /// # Errors
    ///
    /// If this [`Vehicle`] is not [`Status::Available`].
    pub fn mark_rented(&mut self) -> Result<(), StatusError> {
        self.transition(Status::Available, Status::Rented)
    }

    /// Transitions this [`Vehicle`] back to the [`Status::Available`].
    ///
    /// # Errors
    ///
    /// If this [`Vehicle`] is not [`Status::Rented`].
    pub fn mark_available(&mut self) -> Result<(), StatusError> {
        self.transition(Status::Rented, Status::Available)
    }

    /// Withdraws this [`Vehicle`] from the fleet.
    ///
    /// [`Status::OutOfService`] is terminal, so there is no way back.
    ///
    /// # Errors
    ///
    /// If this [`Vehicle`] is not [`Status::Available`].
    pub fn mark_out_of_service(&mut self) -> Result<(), StatusError> {
        self.transition(Status::Available, Status::OutOfService)
    }

    /// Advances the odometer of this [`Vehicle`] to the given [`Mileage`].
    ///
    /// The odometer never runs backwards, so the greater of the two readings
    /// wins.
    pub fn record_mileage(&mut self, mileage: Mileage) {
        if mileage > self.mileage {
            self.mileage = mileage;
        }
    }

    /// Replaces the expected [`Status`] of this [`Vehicle`] with the `to` one.
    fn transition(
        &mut self,
        from: Status,
        to: Status,
    ) -> Result<(), StatusError> {
        if self.status != from {
            return Err(StatusError { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
}

/// ID of a [`Vehicle`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

/// License plate of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct LicensePlate(String);

impl LicensePlate {
    /// Creates a new [`LicensePlate`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `plate` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(plate: impl Into<String>) -> Self {
        Self(plate.into())
    }

    /// Creates a new [`LicensePlate`] if the given `plate` is valid.
    ///
    /// Letter case is not significant on a plate, so it's normalized to
    /// uppercase.
    #[must_use]
    pub fn new(plate: impl Into<String>) -> Option<Self> {
        let plate = plate.into().to_uppercase();
        Self::check(&plate).then_some(Self(plate))
    }

    /// Checks whether the given `plate` is a valid [`LicensePlate`].
    fn check(plate: impl AsRef<str>) -> bool {
        /// Regular expression checking [`LicensePlate`] invariants:
        /// - Must contain only digits, Latin letters, spaces or hyphens;
        /// - Must start and end with a digit or a letter;
        /// - Must be between 2 and 16 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[0-9A-Z][0-9A-Z -]{0,14}[0-9A-Z]$")
                .expect("valid regex")
        });

        REGEX.is_match(plate.as_ref())
    }
}

impl FromStr for LicensePlate {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `LicensePlate`")
    }
}

/// Brand of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Brand(String);

impl Brand {
    /// Creates a new [`Brand`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `brand` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(brand: impl Into<String>) -> Self {
        Self(brand.into())
    }

    /// Creates a new [`Brand`] if the given `brand` is valid.
    #[must_use]
    pub fn new(brand: impl Into<String>) -> Option<Self> {
        let brand = brand.into();
        Self::check(&brand).then_some(Self(brand))
    }

    /// Checks whether the given `brand` is a valid [`Brand`].
    fn check(brand: impl AsRef<str>) -> bool {
        let brand = brand.as_ref();
        brand.trim() == brand && !brand.is_empty() && brand.len() <= 512
    }
}

impl FromStr for Brand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Brand`")
    }
}

/// Model of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `model` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(model: impl Into<String>) -> Self {
        Self(model.into())
    }

    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        Self::check(&model).then_some(Self(model))
    }

    /// Checks whether the given `model` is a valid [`Model`].
    fn check(model: impl AsRef<str>) -> bool {
        let model = model.as_ref();
        model.trim() == model && !model.is_empty() && model.len() <= 512
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Branch location of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `location` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Indicates whether this [`Location`] names the same branch as the
    /// `other` one, ignoring letter case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 512
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Model year of a [`Vehicle`].
pub type ModelYear = u16;

/// Odometer reading of a [`Vehicle`], in kilometers.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Mileage(u64);

impl Mileage {
    /// [`Mileage`] of a brand new [`Vehicle`].
    pub const ZERO: Self = Self(0);

    /// Number of kilometers driven since the given `earlier` reading.
    ///
    /// [`None`] is returned if the `earlier` reading is ahead of this one.
    #[must_use]
    pub fn distance_from(self, earlier: Self) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

define_kind! {
    #[doc = "Category of a [`Vehicle`]."]
    enum Category {
        #[doc = "Small economy car."]
        Economy = 1,

        #[doc = "Compact car."]
        Compact = 2,

        #[doc = "Midsize sedan."]
        Midsize = 3,

        #[doc = "Premium sedan."]
        Premium = 4,

        #[doc = "Sport utility vehicle."]
        Suv = 5,

        #[doc = "Passenger van."]
        Van = 6,

        #[doc = "Sports car."]
        Sports = 7,
    }
}

define_kind! {
    #[doc = "Status of a [`Vehicle`]."]
    enum Status {
        #[doc = "Stationed at its branch and open for rentals."]
        Available = 1,

        #[doc = "Handed out to a customer."]
        Rented = 2,

        #[doc = "Withdrawn from the fleet."]
        OutOfService = 3,
    }
}

/// Error of an invalid [`Status`] transition of a [`Vehicle`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("cannot transition `{from}` vehicle to `{to}` status")]
pub struct StatusError {
    /// [`Status`] the [`Vehicle`] is in.
    pub from: Status,

    /// [`Status`] the transition was aimed at.
    pub to: Status,
}

/// [`Vehicle`] to be added to the fleet, without an [`Id`] assigned yet.
#[derive(Clone, Debug)]
pub struct New {
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
}

impl New {
    /// Materializes this [`New`] vehicle under the given [`Id`].
    ///
    /// The [`Vehicle`] starts out as [`Status::Available`].
    #[must_use]
    pub fn with_id(self, id: Id) -> Vehicle {
        let Self {
            license_plate,
            brand,
            model,
            category,
            year,
            mileage,
            location,
            daily_price,
        } = self;

        Vehicle {
            id,
            license_plate,
            brand,
            model,
            category,
            year,
            mileage,
            location,
            daily_price,
            status: Status::Available,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{LicensePlate, Location, Mileage, Status, StatusError};

    fn vehicle() -> super::Vehicle {
        use common::Money;

        super::New {
            license_plate: LicensePlate::new("AB-123-CD").unwrap(),
            brand: super::Brand::new("Toyota").unwrap(),
            model: super::Model::new("Corolla").unwrap(),
            category: super::Category::Midsize,
            year: 2022,
            mileage: Mileage::from(10_000),
            location: Location::new("Lisbon Airport").unwrap(),
            daily_price: "60".parse::<Money>().unwrap(),
        }
        .with_id(1.into())
    }

    #[test]
    fn rents_out_and_returns() {
        let mut v = vehicle();
        assert!(v.is_available());

        v.mark_rented().unwrap();
        assert_eq!(v.status, Status::Rented);
        assert!(!v.is_available());

        v.mark_available().unwrap();
        assert_eq!(v.status, Status::Available);
    }

    #[test]
    fn refuses_double_rent_out() {
        let mut v = vehicle();
        v.mark_rented().unwrap();

        assert_eq!(
            v.mark_rented(),
            Err(StatusError { from: Status::Rented, to: Status::Rented }),
        );
    }

    #[test]
    fn out_of_service_is_terminal() {
        let mut v = vehicle();
        v.mark_out_of_service().unwrap();

        assert!(v.mark_rented().is_err());
        assert!(v.mark_available().is_err());
        assert!(v.mark_out_of_service().is_err());
    }

    #[test]
    fn refuses_withdrawing_rented_out() {
        let mut v = vehicle();
        v.mark_rented().unwrap();

        assert_eq!(
            v.mark_out_of_service(),
            Err(StatusError {
                from: Status::Rented,
                to: Status::OutOfService,
            }),
        );
    }

    #[test]
    fn odometer_never_runs_backwards() {
        let mut v = vehicle();

        v.record_mileage(Mileage::from(10_350));
        assert_eq!(v.mileage, Mileage::from(10_350));

        v.record_mileage(Mileage::from(9_000));
        assert_eq!(v.mileage, Mileage::from(10_350));
    }

    #[test]
    fn license_plate_normalizes_case() {
        assert_eq!(
            LicensePlate::new("ab-123-cd").unwrap(),
            LicensePlate::new("AB-123-CD").unwrap(),
        );

        assert!(LicensePlate::new("").is_none());
        assert!(LicensePlate::new("A").is_none());
        assert!(LicensePlate::new("-AB123").is_none());
        assert!(LicensePlate::new("AB_123").is_none());
        assert!(LicensePlate::new("AB 123 CD").is_some());
    }

    #[test]
    fn location_matches_ignoring_case() {
        let lisbon = Location::new("Lisbon Airport").unwrap();

        assert!(lisbon.matches(&Location::new("LISBON AIRPORT").unwrap()));
        assert!(!lisbon.matches(&Location::new("Porto Airport").unwrap()));
    }
}
