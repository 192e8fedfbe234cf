//! [`Vehicle`]-related read definitions.

use common::DateRange;

#[cfg(doc)]
use crate::domain::Vehicle;
use crate::domain::vehicle::{Category, Location};

/// Criteria of searching for [`Vehicle`]s open for booking.
///
/// Matches available [`Vehicle`]s of the [`Category`] stationed at the
/// [`Location`] (ignoring letter case) that have no confirmed booking
/// overlapping the `period`.
#[derive(Clone, Debug)]
pub struct Availability {
    /// [`Category`] the [`Vehicle`]s must be of.
    pub category: Category,

    /// [`Location`] the [`Vehicle`]s must be stationed at.
    pub location: Location,

    /// Period the [`Vehicle`]s must be free over.
    pub period: DateRange,
}
