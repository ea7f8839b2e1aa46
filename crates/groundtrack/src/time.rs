//! Civil time, Julian dates and sidereal angle.
//!
//! [`julian_date`] is the only calendar-to-Julian-Date routine in the crate. The
//! sidereal rotation and the propagator adapter both call it, so the Earth's
//! rotation angle and the propagation epoch can never disagree about what a
//! given instant is.

use std::f64::consts::TAU;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};

use crate::error::{Error, Result};

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000: f64 = 2_451_545.0;

/// Days per Julian century.
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Minutes per day.
pub const MINUTES_PER_DAY: f64 = 1_440.0;

/// Julian Date of a UTC calendar instant.
///
/// Valid for years 1901 through 2099, which covers every epoch a TLE can encode.
#[must_use]
pub fn julian_date(datetime: &NaiveDateTime) -> f64 {
    let year = f64::from(datetime.year());
    let month = f64::from(datetime.month());
    let day = f64::from(datetime.day());

    let seconds = f64::from(datetime.second()) + f64::from(datetime.nanosecond()) / 1e9;
    let hours = f64::from(datetime.hour()) + f64::from(datetime.minute()) / 60.0 + seconds / 3600.0;

    367.0 * year - (7.0 * (year + ((month + 9.0) / 12.0).floor()) / 4.0).floor()
        + (275.0 * month / 9.0).floor()
        + day
        + 1_721_013.5
        + hours / 24.0
}

/// Julian Date of a UTC timestamp.
#[must_use]
pub fn julian_date_utc(at: &DateTime<Utc>) -> f64 {
    julian_date(&at.naive_utc())
}

/// Greenwich Mean Sidereal Time in radians, reduced to `[0, 2π)`.
#[must_use]
pub fn gmst(julian_date: f64) -> f64 {
    let days = julian_date - J2000;
    let t = days / DAYS_PER_CENTURY;

    let degrees = 280.460_618_37 + 360.985_647_366_29 * days + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;

    let radians = degrees.rem_euclid(360.0).to_radians();
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if radians >= TAU {
        0.0
    } else {
        radians
    }
}

/// Shift `reference` by a signed number of minutes.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if the result falls outside the range
/// chrono can represent.
pub fn offset_minutes(reference: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| reference.checked_add_signed(delta))
        .ok_or_else(|| {
            Error::invalid_timestamp(format!("cannot offset {reference} by {minutes} minutes"))
        })
}
