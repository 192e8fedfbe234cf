//! Domain definitions.

pub mod audit;
pub mod booking;
pub mod customer;
pub mod pricing;
pub mod vehicle;

pub use self::{booking::Booking, customer::Customer, vehicle::Vehicle};
