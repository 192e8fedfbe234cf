//! [`Customer`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Vehicle;

/// Customer renting [`Vehicle`]s.
#[derive(Clone, Debug)]
pub struct Customer {
    /// ID of this [`Customer`].
    pub id: Id,

    /// First [`Name`] of this [`Customer`].
    pub first_name: Name,

    /// Last [`Name`] of this [`Customer`].
    pub last_name: Name,
}

impl Customer {
    /// Returns the full name of this [`Customer`].
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// ID of a [`Customer`].
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

/// Name of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// [`Customer`] to be persisted, with no [`Id`] assigned yet.
#[derive(Clone, Debug)]
pub struct New {
    /// First [`Name`] of the [`Customer`].
    pub first_name: Name,

    /// Last [`Name`] of the [`Customer`].
    pub last_name: Name,
}

impl New {
    /// Materializes this [`New`] customer under the given [`Id`].
    #[must_use]
    pub fn with_id(self, id: Id) -> Customer {
        let Self { first_name, last_name } = self;
        Customer { id, first_name, last_name }
    }
}
