//! Price calculation rules.
//!
//! Pure and deterministic: every amount is exact decimal math, never
//! floating point.

use common::{Date, DateRange, DateTime, Money};
use derive_more::{Display, Error};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::Vehicle;
use crate::domain::{
    booking::Extras,
    vehicle::{Category, Mileage},
};

/// Mileage included into every rental day, in kilometers.
pub const DAILY_MILEAGE_ALLOWANCE_KM: u64 = 300;

/// Seconds in a whole day, for late fee math.
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Returns the rate of renting a [`Category`] vehicle for one day.
#[must_use]
pub fn daily_rate(category: Category) -> Money {
    match category {
        Category::Economy => Decimal::new(30_00, 2),
        Category::Compact => Decimal::new(40_00, 2),
        Category::Midsize => Decimal::new(60_00, 2),
        Category::Premium => Decimal::new(100_00, 2),
        Category::Suv => Decimal::new(80_00, 2),
        Category::Van => Decimal::new(70_00, 2),
        Category::Sports => Decimal::new(150_00, 2),
    }
    .into()
}

/// Returns the number of billable rental days between the `pickup_date` and
/// the `return_date`, counting both ends.
///
/// A same-day rental counts as 1 day.
///
/// # Errors
///
/// If `pickup_date` comes after `return_date`.
pub fn rental_days(
    pickup_date: Date,
    return_date: Date,
) -> Result<i64, InvalidRange> {
    DateRange::new(pickup_date, return_date)
        .map(|period| period.days())
        .ok_or(InvalidRange)
}

/// Calculates the base price of renting a [`Category`] vehicle from the
/// `pickup_date` to the `return_date`.
///
/// # Errors
///
/// If `pickup_date` comes after `return_date`.
pub fn base_price(
    category: Category,
    pickup_date: Date,
    return_date: Date,
) -> Result<Money, InvalidRange> {
    let days = rental_days(pickup_date, return_date)?;
    Ok(daily_rate(category) * days)
}

/// Calculates the cost of the selected [`Extras`] over the given number of
/// rental `days`.
///
/// # Errors
///
/// If `days` is less than 1.
pub fn extras_cost(days: i64, extras: Extras) -> Result<Money, InvalidRange> {
    if days < 1 {
        return Err(InvalidRange);
    }

    let mut cost = Money::ZERO;
    if extras.insurance {
        cost += Money::from(Decimal::new(10_00, 2)) * days;
    }
    if extras.additional_driver {
        cost += Money::from(Decimal::new(5_00, 2)) * days;
    }
    if extras.child_seat {
        cost += Money::from(Decimal::new(3_00, 2)) * days;
    }
    Ok(cost)
}

/// Calculates the fee for driving a [`Vehicle`] beyond the mileage allowance
/// of a rental.
///
/// Zero is charged when either odometer reading is missing, or the driven
/// distance fits into the allowance of
/// [`DAILY_MILEAGE_ALLOWANCE_KM`]` * days`.
#[must_use]
pub fn excess_mileage_cost(
    days: i64,
    checkout: Option<Mileage>,
    checkin: Option<Mileage>,
) -> Money {
    let (Some(checkout), Some(checkin)) = (checkout, checkin) else {
        return Money::ZERO;
    };
    let Some(driven) = checkin.distance_from(checkout) else {
        return Money::ZERO;
    };

    let allowance = DAILY_MILEAGE_ALLOWANCE_KM * days.max(0).unsigned_abs();
    let Some(excess) = driven.checked_sub(allowance) else {
        return Money::ZERO;
    };
    if excess == 0 {
        return Money::ZERO;
    }

    Money::from(Decimal::new(25, 2)) * excess
}

/// Calculates the fee for returning a [`Vehicle`] past the `planned` return
/// [`Date`].
///
/// The return counts as late once the `actual` moment is past the very end
/// of the `planned` day. Every started day of delay is billed as a whole
/// one.
#[must_use]
pub fn late_fee(planned: Option<Date>, actual: Option<DateTime>) -> Money {
    let (Some(planned), Some(actual)) = (planned, actual) else {
        return Money::ZERO;
    };

    let deadline = planned.end_of_day();
    if actual <= deadline {
        return Money::ZERO;
    }

    let days_late = ((actual - deadline).as_secs() / SECS_PER_DAY).max(1);
    Money::from(Decimal::new(50_00, 2)) * days_late
}

/// Error of pricing a rental period not covering even a single day.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("rental period must cover at least one day")]
pub struct InvalidRange;

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Money};

    use crate::domain::{booking::Extras, vehicle::Category};

    use super::{
        base_price, daily_rate, excess_mileage_cost, extras_cost, late_fee,
        rental_days, InvalidRange,
    };

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn counts_rental_days_inclusively() {
        let jan_10 = date("2025-01-10");
        let jan_12 = date("2025-01-12");

        assert_eq!(rental_days(jan_10, jan_10).unwrap(), 1);
        assert_eq!(rental_days(jan_10, jan_12).unwrap(), 3);
        assert_eq!(rental_days(jan_12, jan_10), Err(InvalidRange));
    }

    #[test]
    fn rates_are_distinct_per_category() {
        assert_eq!(daily_rate(Category::Economy), money("30.00"));
        assert_eq!(daily_rate(Category::Compact), money("40.00"));
        assert_eq!(daily_rate(Category::Midsize), money("60.00"));
        assert_eq!(daily_rate(Category::Premium), money("100.00"));
        assert_eq!(daily_rate(Category::Suv), money("80.00"));
        assert_eq!(daily_rate(Category::Van), money("70.00"));
        assert_eq!(daily_rate(Category::Sports), money("150.00"));
    }

    #[test]
    fn prices_base_by_category_and_days() {
        assert_eq!(
            base_price(Category::Midsize, date("2025-01-10"), date("2025-01-12"))
                .unwrap(),
            money("180.00"),
        );
        assert_eq!(
            base_price(Category::Economy, date("2025-01-10"), date("2025-01-10"))
                .unwrap(),
            money("30.00"),
        );

        assert_eq!(
            base_price(Category::Suv, date("2025-01-12"), date("2025-01-10")),
            Err(InvalidRange),
        );
    }

    #[test]
    fn prices_extras_per_day() {
        let all = Extras {
            insurance: true,
            additional_driver: true,
            child_seat: true,
        };

        assert_eq!(extras_cost(2, all).unwrap(), money("36.00"));
        assert_eq!(extras_cost(2, Extras::NONE).unwrap(), Money::ZERO);
        assert_eq!(
            extras_cost(3, Extras { insurance: true, ..Extras::NONE })
                .unwrap(),
            money("30.00"),
        );

        assert_eq!(extras_cost(0, all), Err(InvalidRange));
    }

    #[test]
    fn bills_excess_mileage_over_allowance() {
        // 700 km driven over 2 days leaves 100 km past the 600 km allowance.
        assert_eq!(
            excess_mileage_cost(2, Some(10_000.into()), Some(10_700.into())),
            money("25.00"),
        );

        // 600 km fit into the allowance exactly.
        assert_eq!(
            excess_mileage_cost(2, Some(10_000.into()), Some(10_600.into())),
            Money::ZERO,
        );

        assert_eq!(
            excess_mileage_cost(2, None, Some(10_700.into())),
            Money::ZERO,
        );
        assert_eq!(
            excess_mileage_cost(2, Some(10_000.into()), None),
            Money::ZERO,
        );

        // Readings out of order charge nothing.
        assert_eq!(
            excess_mileage_cost(2, Some(10_700.into()), Some(10_000.into())),
            Money::ZERO,
        );
    }

    #[test]
    fn bills_every_started_late_day() {
        let planned = date("2025-01-10");
        let at = |s| DateTime::from_rfc3339(s).unwrap();

        assert_eq!(
            late_fee(Some(planned), Some(at("2025-01-10T12:00:00Z"))),
            Money::ZERO,
        );
        assert_eq!(
            late_fee(Some(planned), Some(at("2025-01-11T12:00:00Z"))),
            money("50.00"),
        );
        // 2 whole days plus a second past the deadline.
        assert_eq!(
            late_fee(Some(planned), Some(at("2025-01-13T00:00:00Z"))),
            money("100.00"),
        );

        assert_eq!(
            late_fee(None, Some(at("2025-01-11T12:00:00Z"))),
            Money::ZERO,
        );
        assert_eq!(late_fee(Some(planned), None), Money::ZERO);
    }
}
