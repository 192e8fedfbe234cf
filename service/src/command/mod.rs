//! [`Command`] definition.

pub mod add_vehicle;
pub mod cancel_booking;
pub mod checkin_vehicle;
pub mod checkout_vehicle;
pub mod confirm_booking;
pub mod create_booking;
pub mod set_vehicle_out_of_service;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_vehicle::AddVehicle, cancel_booking::CancelBooking,
    checkin_vehicle::CheckinVehicle, checkout_vehicle::CheckoutVehicle,
    confirm_booking::ConfirmBooking, create_booking::CreateBooking,
    set_vehicle_out_of_service::SetVehicleOutOfService,
};
