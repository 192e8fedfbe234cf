//! Audit log definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Booking, Vehicle};
use crate::domain::{booking, vehicle};

/// Single line of the audit log.
///
/// Appended in the same transaction as the action it describes, so a
/// committed action never loses its line.
#[derive(Clone, Debug)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// [`Actor`] who performed the [`Action`].
    pub actor: Actor,

    /// Performed [`Action`].
    pub action: Action,

    /// [`Subject`] the [`Action`] was performed upon.
    pub subject: Subject,

    /// Human-readable [`Detail`] of the [`Action`].
    pub detail: Detail,

    /// [`Origin`] the [`Action`] came from, if known.
    pub origin: Option<Origin>,

    /// [`DateTime`] when this [`Entry`] was recorded.
    pub recorded_at: RecordingDateTime,
}

/// ID of an [`Entry`].
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

define_kind! {
    #[doc = "Action recorded by an [`Entry`]."]
    enum Action {
        #[doc = "[`Booking`] was created."]
        BookingCreated = 1,

        #[doc = "[`Booking`] was confirmed."]
        BookingConfirmed = 2,

        #[doc = "[`Booking`] was cancelled."]
        BookingCancelled = 3,

        #[doc = "[`Vehicle`] of a [`Booking`] was handed out."]
        BookingCheckedOut = 4,

        #[doc = "[`Vehicle`] was added to the fleet."]
        VehicleAdded = 5,

        #[doc = "[`Vehicle`] was withdrawn from the fleet."]
        VehicleOutOfService = 6,
    }
}

/// Entity an [`Action`] was performed upon.
#[derive(Clone, Copy, Debug, Display, Eq, From, PartialEq)]
pub enum Subject {
    /// [`Booking`] an [`Action`] was performed upon.
    #[display("BOOKING {_0}")]
    Booking(booking::Id),

    /// [`Vehicle`] an [`Action`] was performed upon.
    #[display("VEHICLE {_0}")]
    Vehicle(vehicle::Id),
}

impl Subject {
    /// Returns the [`Kind`] of this [`Subject`].
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Booking(_) => Kind::Booking,
            Self::Vehicle(_) => Kind::Vehicle,
        }
    }
}

define_kind! {
    #[doc = "Kind of a [`Subject`]."]
    enum Kind {
        #[doc = "A [`Booking`]."]
        Booking = 1,

        #[doc = "A [`Vehicle`]."]
        Vehicle = 2,
    }
}

/// Actor who performed an [`Action`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Actor(String);

impl Actor {
    /// Creates a new [`Actor`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `actor` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(actor: impl Into<String>) -> Self {
        Self(actor.into())
    }

    /// Creates a new [`Actor`] if the given `actor` is valid.
    #[must_use]
    pub fn new(actor: impl Into<String>) -> Option<Self> {
        let actor = actor.into();
        Self::check(&actor).then_some(Self(actor))
    }

    /// Checks whether the given `actor` is a valid [`Actor`].
    fn check(actor: impl AsRef<str>) -> bool {
        let actor = actor.as_ref();
        actor.trim() == actor && !actor.is_empty() && actor.len() <= 512
    }
}

impl FromStr for Actor {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Actor`")
    }
}

/// Origin an [`Action`] came from (an IP address or a channel name).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Origin(String);

impl Origin {
    /// Creates a new [`Origin`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `origin` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    /// Creates a new [`Origin`] if the given `origin` is valid.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Option<Self> {
        let origin = origin.into();
        Self::check(&origin).then_some(Self(origin))
    }

    /// Checks whether the given `origin` is a valid [`Origin`].
    fn check(origin: impl AsRef<str>) -> bool {
        let origin = origin.as_ref();
        origin.trim() == origin && !origin.is_empty() && origin.len() <= 512
    }
}

impl FromStr for Origin {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Origin`")
    }
}

/// Human-readable detail line of an [`Entry`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(forward)]
#[from(&str, String)]
pub struct Detail(String);

/// [`Entry`] to be appended to the audit log, with no [`Id`] assigned yet.
#[derive(Clone, Debug)]
pub struct New {
    /// [`Actor`] who performed the [`Action`].
    pub actor: Actor,

    /// Performed [`Action`].
    pub action: Action,

    /// [`Subject`] the [`Action`] was performed upon.
    pub subject: Subject,

    /// Human-readable [`Detail`] of the [`Action`].
    pub detail: Detail,

    /// [`Origin`] the [`Action`] came from, if known.
    pub origin: Option<Origin>,

    /// [`DateTime`] when the [`Entry`] was recorded.
    pub recorded_at: RecordingDateTime,
}

impl New {
    /// Materializes this [`New`] entry under the given [`Id`].
    #[must_use]
    pub fn with_id(self, id: Id) -> Entry {
        let Self { actor, action, subject, detail, origin, recorded_at } =
            self;

        Entry { id, actor, action, subject, detail, origin, recorded_at }
    }
}

/// [`DateTime`] when an [`Entry`] was recorded.
pub type RecordingDateTime = DateTimeOf<(Entry, unit::Creation)>;
