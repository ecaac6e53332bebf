//! Time source and calendar arithmetic.
//!
//! `now` is the only place the ledger timestamp is read; everything below it
//! takes the time as an argument.

use crate::types::Error;
use soroban_sdk::Env;

pub const DAY_SECONDS: u64 = 86_400;

pub fn now(env: &Env) -> u64 {
    env.ledger().timestamp()
}

/// `start + days`, in seconds.
pub fn add_days(start: u64, days: u32) -> Result<u64, Error> {
    let span = (days as u64)
        .checked_mul(DAY_SECONDS)
        .ok_or(Error::Overflow)?;
    start.checked_add(span).ok_or(Error::Overflow)
}

/// Midnight UTC on the first day of the calendar month containing `ts`.
pub fn month_start(ts: u64) -> u64 {
    let days = ts / DAY_SECONDS;
    let day_of_month = civil_day_of_month(days);
    (days - (day_of_month - 1)) * DAY_SECONDS
}

/// Day of month (1..=31) for a count of days since 1970-01-01.
fn civil_day_of_month(days: u64) -> u64 {
    // Proleptic Gregorian, epoch shifted to 0000-03-01.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    doy - (153 * mp + 2) / 5 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAR_01_2024: u64 = 1_709_251_200;
    const MAR_15_2024: u64 = 1_710_460_800;
    const APR_01_2024: u64 = 1_711_929_600;
    const FEB_01_2024: u64 = 1_706_745_600;
    const FEB_29_2024: u64 = 1_709_164_800;

    #[test]
    fn month_start_of_mid_month() {
        assert_eq!(month_start(MAR_15_2024 + 3_600), MAR_01_2024);
    }

    #[test]
    fn month_start_on_boundaries() {
        assert_eq!(month_start(MAR_01_2024), MAR_01_2024);
        assert_eq!(month_start(APR_01_2024 - 1), MAR_01_2024);
        assert_eq!(month_start(APR_01_2024), APR_01_2024);
    }

    #[test]
    fn month_start_handles_leap_day() {
        assert_eq!(month_start(FEB_29_2024 + 50_000), FEB_01_2024);
    }

    #[test]
    fn month_start_of_epoch() {
        assert_eq!(month_start(0), 0);
        assert_eq!(month_start(DAY_SECONDS * 40), DAY_SECONDS * 31);
    }

    #[test]
    fn add_days_overflow_is_reported() {
        assert_eq!(add_days(10, 2), Ok(10 + 2 * DAY_SECONDS));
        assert_eq!(add_days(u64::MAX - 5, 1), Err(Error::Overflow));
    }
}
