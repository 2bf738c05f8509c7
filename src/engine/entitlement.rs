//! Tenure-based annual leave entitlement.
//!
//! Regulatory accrual law: nothing below six full months of service, two days
//! per month beyond the sixth (capped at 24), the full 30 days from one year
//! of service.

use chrono::{Datelike, NaiveDate};

pub const FULL_ENTITLEMENT_DAYS: u32 = 30;
pub const ACCRUAL_DAYS_PER_MONTH: u32 = 2;
pub const ACCRUAL_CAP_DAYS: u32 = 24;
pub const MIN_SERVICE_MONTHS: u32 = 6;
pub const FULL_SERVICE_MONTHS: u32 = 12;

/// Complete month-intervals of service from the hire date through the end of
/// the target year. Hires on or before January 1st count the full 12 months;
/// hires after the year has ended (or outside the supported calendar range)
/// count zero.
pub fn full_months_of_service(hire_date: NaiveDate, year: i32) -> u32 {
    let (Some(year_start), Some(year_end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return 0;
    };
    if hire_date <= year_start {
        return FULL_SERVICE_MONTHS;
    }
    if hire_date > year_end {
        return 0;
    }
    // The hire falls inside the target year: count months that complete by
    // December 31st. A month completes when its day-of-month comes around
    // again, so e.g. hired 2024-08-01 has 4 full months by 2024-12-31.
    let mut months = 12 - hire_date.month();
    if year_end.day() < hire_date.day() {
        months = months.saturating_sub(1);
    }
    months
}

/// Annual leave day entitlement for the target year.
pub fn annual_entitlement_days(hire_date: NaiveDate, year: i32) -> u32 {
    let months = full_months_of_service(hire_date, year);
    if months < MIN_SERVICE_MONTHS {
        0
    } else if months >= FULL_SERVICE_MONTHS {
        FULL_ENTITLEMENT_DAYS
    } else {
        (ACCRUAL_DAYS_PER_MONTH * (months - MIN_SERVICE_MONTHS)).min(ACCRUAL_CAP_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hired_on_january_first_gets_full_entitlement() {
        assert_eq!(full_months_of_service(date(2024, 1, 1), 2024), 12);
        assert_eq!(annual_entitlement_days(date(2024, 1, 1), 2024), 30);
    }

    #[test]
    fn hired_in_prior_years_gets_full_entitlement() {
        assert_eq!(annual_entitlement_days(date(2019, 7, 15), 2024), 30);
    }

    #[test]
    fn hired_in_august_is_below_the_six_month_threshold() {
        // 2024-08-01 through 2024-12-31 is 4 full months.
        assert_eq!(full_months_of_service(date(2024, 8, 1), 2024), 4);
        assert_eq!(annual_entitlement_days(date(2024, 8, 1), 2024), 0);
    }

    #[test]
    fn partial_year_accrues_two_days_per_month_over_six() {
        // Hired in March: 9 full months by December 31st.
        assert_eq!(full_months_of_service(date(2024, 3, 1), 2024), 9);
        assert_eq!(annual_entitlement_days(date(2024, 3, 1), 2024), 6);
        // Hired Feb 1st: 10 months -> 8 days.
        assert_eq!(annual_entitlement_days(date(2024, 2, 1), 2024), 8);
    }

    #[test]
    fn month_only_counts_once_its_day_comes_around() {
        // 2024-06-15: June is not complete until July 15th, so 6 months by
        // December 31st (through December 15th).
        assert_eq!(full_months_of_service(date(2024, 6, 15), 2024), 6);
        assert_eq!(annual_entitlement_days(date(2024, 6, 15), 2024), 0);
    }

    #[test]
    fn hired_after_the_year_has_no_service() {
        assert_eq!(full_months_of_service(date(2025, 2, 1), 2024), 0);
        assert_eq!(annual_entitlement_days(date(2025, 2, 1), 2024), 0);
    }

    proptest! {
        #[test]
        fn entitlement_stays_within_the_legal_bands(
            offset in 0i64..15_000,
            year in 2015i32..2060,
        ) {
            let hire = date(1995, 1, 1) + chrono::Duration::days(offset);
            let days = annual_entitlement_days(hire, year);
            // Either nothing, the full 30, or an even prorated amount.
            prop_assert!(days == 0 || days == 30 || (days % 2 == 0 && days <= 24));
        }

        #[test]
        fn below_six_months_is_always_zero(year in 2015i32..2060, month in 8u32..=12) {
            let hire = date(year, month, 1);
            prop_assert!(full_months_of_service(hire, year) < 6);
            prop_assert_eq!(annual_entitlement_days(hire, year), 0);
        }

        #[test]
        fn a_full_year_of_service_is_always_thirty(year in 2015i32..2060) {
            let hire = date(year - 1, 1, 1);
            prop_assert_eq!(annual_entitlement_days(hire, year), 30);
        }
    }
}
