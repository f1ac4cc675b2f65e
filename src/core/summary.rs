use chrono::NaiveDateTime;

use super::engine::{current_balance_with, project_from_balance};
use super::types::{
    AccrualStrategy, Contribution, Entity, EntitySummary, MonthRecord, PortfolioSummary,
};

fn goal_progress_pct(balance: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        (balance / goal * 100.0).min(100.0)
    } else {
        0.0
    }
}

// Only contributions the engine accrues: from the creation day through `now`'s day.
fn accrued_contributions(
    entity: &Entity,
    now: NaiveDateTime,
) -> impl Iterator<Item = &Contribution> {
    let first_day = entity.params.created_at.date();
    let last_day = now.date();
    entity.contributions.iter().filter(move |c| {
        let day = c.occurred_at.date();
        first_day <= day && day <= last_day
    })
}

fn total_contributions(entity: &Entity, now: NaiveDateTime) -> f64 {
    accrued_contributions(entity, now).map(|c| c.amount).sum()
}

pub fn summarize_entity(
    entity: &Entity,
    now: NaiveDateTime,
    strategy: AccrualStrategy,
) -> EntitySummary {
    let params = &entity.params;
    let current_balance = current_balance_with(strategy, params, &entity.contributions, now);
    let total_contributions = total_contributions(entity, now);

    EntitySummary {
        current_balance,
        initial_capital: params.initial_capital,
        total_contributions,
        interest_earned: current_balance - params.initial_capital - total_contributions,
        savings_goal: params.savings_goal,
        goal_progress_pct: goal_progress_pct(current_balance, params.savings_goal),
        remaining_to_goal: (params.savings_goal - current_balance).max(0.0),
        daily_rate_pct: params.daily_rate_pct(),
        monthly_rate_pct: params.monthly_rate_pct(),
        last_contribution_at: accrued_contributions(entity, now)
            .map(|c| c.occurred_at)
            .max(),
    }
}

pub fn summarize_portfolio(
    entities: &[Entity],
    now: NaiveDateTime,
    strategy: AccrualStrategy,
) -> PortfolioSummary {
    let mut total_balance = 0.0;
    let mut total_capital = 0.0;
    let mut total_contributions_sum = 0.0;
    let mut total_goal = 0.0;

    for entity in entities {
        total_balance +=
            current_balance_with(strategy, &entity.params, &entity.contributions, now);
        total_capital += entity.params.initial_capital;
        total_contributions_sum += total_contributions(entity, now);
        total_goal += entity.params.savings_goal;
    }

    PortfolioSummary {
        total_balance,
        total_capital,
        total_contributions: total_contributions_sum,
        total_interest_earned: total_balance - total_capital - total_contributions_sum,
        total_goal,
        goal_progress_pct: goal_progress_pct(total_balance, total_goal),
        entity_count: entities.len(),
    }
}

pub fn aggregate_projection(
    entities: &[Entity],
    now: NaiveDateTime,
    months: u32,
    strategy: AccrualStrategy,
) -> Vec<MonthRecord> {
    let projections: Vec<Vec<MonthRecord>> = entities
        .iter()
        .map(|entity| {
            let balance =
                current_balance_with(strategy, &entity.params, &entity.contributions, now);
            project_from_balance(&entity.params, balance, now, months)
        })
        .collect();

    let Some(first) = projections.first() else {
        return Vec::new();
    };

    first
        .iter()
        .enumerate()
        .map(|(i, template)| MonthRecord {
            index: template.index,
            label: template.label.clone(),
            start_balance: projections.iter().map(|p| p[i].start_balance).sum(),
            interest: projections.iter().map(|p| p[i].interest).sum(),
            contributions: 0.0,
            end_balance: projections.iter().map(|p| p[i].end_balance).sum(),
        })
        .collect()
}
