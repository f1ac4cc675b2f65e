use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, trace};

use super::calendar::{MonthKey, days_inclusive, inclusive_days};
use super::types::{AccrualStrategy, Contribution, EntityParams, MonthRecord};

pub const DEFAULT_PROJECTION_MONTHS: u32 = 12;
pub const PROJECTION_DAYS_PER_MONTH: u32 = 30;

const LONG_SPAN_DAYS: u64 = 365 * 100;

#[derive(Debug)]
struct MonthAccumulator {
    month: MonthKey,
    start_balance: f64,
    interest: f64,
    contributions: f64,
}

impl MonthAccumulator {
    fn open(month: MonthKey, start_balance: f64) -> Self {
        Self {
            month,
            start_balance,
            interest: 0.0,
            contributions: 0.0,
        }
    }

    fn close(self, index: u32, end_balance: f64) -> MonthRecord {
        MonthRecord {
            index,
            label: self.month.label(),
            start_balance: self.start_balance,
            interest: self.interest,
            contributions: self.contributions,
            end_balance,
        }
    }
}

// Same-day amounts are summed in input order.
fn contributions_by_day(contributions: &[Contribution]) -> BTreeMap<NaiveDate, f64> {
    let mut by_day = BTreeMap::new();
    for contribution in contributions {
        *by_day
            .entry(contribution.occurred_at.date())
            .or_insert(0.0) += contribution.amount;
    }
    by_day
}

fn compound_factor(daily_factor: f64, days: i64) -> f64 {
    match i32::try_from(days) {
        Ok(n) => daily_factor.powi(n),
        Err(_) => daily_factor.powf(days as f64),
    }
}

pub fn current_balance(
    params: &EntityParams,
    contributions: &[Contribution],
    now: NaiveDateTime,
) -> f64 {
    let start = params.created_at.date();
    let end = now.date();
    let span = inclusive_days(start, end);
    if span > LONG_SPAN_DAYS {
        debug!("daily accrual over {span} days; consider the segmented strategy");
    }

    let by_day = contributions_by_day(contributions);
    let daily_factor = params.daily_growth_factor();
    let mut balance = params.initial_capital;
    for day in days_inclusive(start, end) {
        balance *= daily_factor;
        if let Some(amount) = by_day.get(&day) {
            balance += amount;
        }
    }
    balance
}

pub fn current_balance_segmented(
    params: &EntityParams,
    contributions: &[Contribution],
    now: NaiveDateTime,
) -> f64 {
    let start = params.created_at.date();
    let end = now.date();
    if end < start {
        return params.initial_capital;
    }

    let by_day = contributions_by_day(contributions);
    let daily_factor = params.daily_growth_factor();
    let mut balance = params.initial_capital;
    let mut last_accrued: Option<NaiveDate> = None;

    for (day, amount) in by_day.range(start..=end) {
        let gap = match last_accrued {
            None => (*day - start).num_days() + 1,
            Some(previous) => (*day - previous).num_days(),
        };
        balance *= compound_factor(daily_factor, gap);
        balance += amount;
        last_accrued = Some(*day);
    }

    let tail = match last_accrued {
        None => inclusive_days(start, end) as i64,
        Some(previous) => (end - previous).num_days(),
    };
    trace!("segmented accrual: tail of {tail} days");
    balance * compound_factor(daily_factor, tail)
}

pub fn current_balance_with(
    strategy: AccrualStrategy,
    params: &EntityParams,
    contributions: &[Contribution],
    now: NaiveDateTime,
) -> f64 {
    match strategy {
        AccrualStrategy::Daily => current_balance(params, contributions, now),
        AccrualStrategy::Segmented => current_balance_segmented(params, contributions, now),
    }
}

pub fn project_forward(
    params: &EntityParams,
    contributions: &[Contribution],
    now: NaiveDateTime,
    months: u32,
) -> Vec<MonthRecord> {
    let balance = current_balance(params, contributions, now);
    project_from_balance(params, balance, now, months)
}

pub fn project_from_balance(
    params: &EntityParams,
    current_balance: f64,
    now: NaiveDateTime,
    months: u32,
) -> Vec<MonthRecord> {
    let daily_rate = params.daily_rate_pct() / 100.0;
    let anchor = MonthKey::of(now.date());
    let mut balance = current_balance;
    let mut projection = Vec::with_capacity(months as usize);

    for m in 1..=months {
        let mut projected = balance;
        let mut interest = 0.0;
        for _ in 0..PROJECTION_DAYS_PER_MONTH {
            let daily_interest = projected * daily_rate;
            projected += daily_interest;
            interest += daily_interest;
        }

        projection.push(MonthRecord {
            index: m,
            label: anchor.offset(m).label(),
            start_balance: balance,
            interest,
            contributions: 0.0,
            end_balance: projected,
        });
        balance = projected;
    }

    projection
}

pub fn monthly_history(
    params: &EntityParams,
    contributions: &[Contribution],
    now: NaiveDateTime,
) -> Vec<MonthRecord> {
    let daily_rate = params.daily_rate_pct() / 100.0;
    let by_day = contributions_by_day(contributions);
    let start = params.created_at.date();
    let end = now.date();

    let mut history = Vec::new();
    let mut balance = params.initial_capital;
    let mut month = MonthAccumulator::open(MonthKey::of(start), balance);

    for day in days_inclusive(start, end) {
        let key = MonthKey::of(day);
        if key != month.month {
            let index = history.len() as u32;
            history.push(month.close(index, balance));
            month = MonthAccumulator::open(key, balance);
        }

        let interest_today = balance * daily_rate;
        balance += interest_today;
        month.interest += interest_today;

        if let Some(amount) = by_day.get(&day) {
            balance += amount;
            month.contributions += amount;
        }
    }

    let index = history.len() as u32;
    history.push(month.close(index, balance));
    history
}
