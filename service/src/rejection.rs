//! Classification of execution errors into caller-facing [`Rejection`]s.

use derive_more::Display;
use tracerr::Traced;

use crate::{command, domain::booking, infra::database, query};

/// Class of a rejected operation, telling the caller what went wrong.
///
/// Callers outside the [`Service`] (HTTP layers, CLIs) map these onto their
/// own wire vocabulary. Errors classifying as [`None`] are internal ones no
/// caller can act upon.
///
/// [`Service`]: crate::Service
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Rejection {
    /// Provided input is malformed or out of range.
    ///
    /// Recoverable by the caller correcting the input.
    #[display("invalid input")]
    InvalidInput,

    /// Referenced entity does not exist.
    #[display("not found")]
    NotFound,

    /// Operation contradicts the current state of its entities.
    ///
    /// Retrying without an external state change repeats the same outcome.
    #[display("conflict")]
    Conflict,
}

/// Helper trait for classifying errors as [`Rejection`]s.
pub trait AsRejection {
    /// Tries to classify this error as a [`Rejection`].
    ///
    /// [`None`] is returned if the error is an internal one.
    fn try_as_rejection(&self) -> Option<Rejection>;
}

impl<E: AsRejection> AsRejection for Traced<E> {
    fn try_as_rejection(&self) -> Option<Rejection> {
        self.as_ref().try_as_rejection()
    }
}

impl AsRejection for database::Error {
    fn try_as_rejection(&self) -> Option<Rejection> {
        None
    }
}

impl AsRejection for command::create_booking::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::CustomerNotExists(_) | Self::VehicleNotExists(_) => {
                Some(Rejection::NotFound)
            }
            Self::InvalidPeriod(_)
            | Self::PickupInPast(_)
            | Self::ReturnBeforePickup { .. } => Some(Rejection::InvalidInput),
            // A just-inserted booking is always a requested one.
            Self::NotConfirmable(_) => None,
            Self::VehicleNotRentable(_) | Self::VehicleUnavailable(_) => {
                Some(Rejection::Conflict)
            }
        }
    }
}

impl AsRejection for command::confirm_booking::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::BookingNotExists(_) => Some(Rejection::NotFound),
            Self::NotConfirmable(_)
            | Self::VehicleNotRentable(_)
            | Self::VehicleUnavailable(_) => Some(Rejection::Conflict),
            // The booking references a vehicle that is gone.
            Self::VehicleNotExists(_) => None,
        }
    }
}

impl AsRejection for command::cancel_booking::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::BookingNotExists(_) => Some(Rejection::NotFound),
            Self::NotCancellable(_) | Self::VehicleNotReleasable(_) => {
                Some(Rejection::Conflict)
            }
            Self::VehicleNotExists(_) => None,
        }
    }
}

impl AsRejection for command::checkout_vehicle::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::BookingNotExists(_) => Some(Rejection::NotFound),
            Self::MileageBelowRecorded { .. } | Self::MileageNotPositive => {
                Some(Rejection::InvalidInput)
            }
            Self::NotCheckoutable(_) => Some(Rejection::Conflict),
            Self::VehicleNotExists(_) => None,
        }
    }
}

impl AsRejection for command::checkin_vehicle::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::BookingNotExists(_) => Some(Rejection::NotFound),
            Self::MileageNotPositive => Some(Rejection::InvalidInput),
            Self::NotCheckinable(e) => Some(match e {
                booking::CheckinError::AlreadyCheckedIn
                | booking::CheckinError::NotCheckedOut => Rejection::Conflict,
                booking::CheckinError::OdometerBelowCheckout { .. } => {
                    Rejection::InvalidInput
                }
            }),
            Self::VehicleNotExists(_) => None,
            Self::VehicleNotReleasable(_) => Some(Rejection::Conflict),
        }
    }
}

impl AsRejection for command::add_vehicle::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::PlateAlreadyUsed(_) => Some(Rejection::Conflict),
            Self::PriceNotPositive(_) => Some(Rejection::InvalidInput),
        }
    }
}

impl AsRejection for command::set_vehicle_out_of_service::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::NotWithdrawable(_) => Some(Rejection::Conflict),
            Self::VehicleNotExists(_) => Some(Rejection::NotFound),
        }
    }
}

impl AsRejection for query::search_available_vehicles::ExecutionError {
    fn try_as_rejection(&self) -> Option<Rejection> {
        match self {
            Self::Db(e) => e.try_as_rejection(),
            Self::PickupInPast(_) | Self::ReturnBeforePickup { .. } => {
                Some(Rejection::InvalidInput)
            }
        }
    }
}
