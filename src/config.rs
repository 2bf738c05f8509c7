use dotenvy::dotenv;
use std::env;

/// Company leave policy knobs.
///
/// The tenure accrual law itself (30 days full, 2 per month over 6 months) is
/// regulatory and lives in `engine::entitlement`; everything here is company
/// policy and can be overridden through the environment.
#[derive(Debug, Clone)]
pub struct LeavePolicy {
    pub max_carry_over_days: f64,
    // MOHRE-style 90-day sick bank, split across pay tiers
    pub sick_full_pay_days: f64,
    pub sick_half_pay_days: f64,
    pub sick_unpaid_days: f64,
    pub maternity_days: f64,
    pub emergency_days: f64,
    pub wfh_weekly_limit: u32,
    pub wfh_monthly_limit: u32,
    pub toil_hours_per_day: f64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            max_carry_over_days: 5.0,
            sick_full_pay_days: 15.0,
            sick_half_pay_days: 30.0,
            sick_unpaid_days: 45.0,
            maternity_days: 60.0,
            emergency_days: 5.0,
            wfh_weekly_limit: 1,
            wfh_monthly_limit: 4,
            toil_hours_per_day: 8.0,
        }
    }
}

impl LeavePolicy {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            max_carry_over_days: env::var("MAX_CARRY_OVER_DAYS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap(),
            sick_full_pay_days: env::var("SICK_FULL_PAY_DAYS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap(),
            sick_half_pay_days: env::var("SICK_HALF_PAY_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            sick_unpaid_days: env::var("SICK_UNPAID_DAYS")
                .unwrap_or_else(|_| "45".to_string())
                .parse()
                .unwrap(),
            maternity_days: env::var("MATERNITY_DAYS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            emergency_days: env::var("EMERGENCY_DAYS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap(),
            wfh_weekly_limit: env::var("WFH_WEEKLY_LIMIT")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap(),
            wfh_monthly_limit: env::var("WFH_MONTHLY_LIMIT")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap(),
            toil_hours_per_day: env::var("TOIL_HOURS_PER_DAY")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap(),
        }
    }
}

/// Batch-runner configuration (see `main.rs`).
#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot_path: String,
    pub output_path: Option<String>,
    /// When set, the carry-over job runs from this year into the next one.
    pub carry_over_from_year: Option<i32>,
    pub policy: LeavePolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            snapshot_path: env::var("LEAVE_SNAPSHOT_PATH").expect("LEAVE_SNAPSHOT_PATH must be set"),
            output_path: env::var("LEAVE_OUTPUT_PATH").ok(),
            carry_over_from_year: env::var("CARRY_OVER_FROM_YEAR")
                .ok()
                .map(|y| y.parse().expect("CARRY_OVER_FROM_YEAR must be a year")),
            policy: LeavePolicy::from_env(),
        }
    }
}
