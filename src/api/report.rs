use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::{
    AccrualStrategy, Entity, EntitySummary, MonthRecord, PortfolioSummary, aggregate_projection,
    format_currency, monthly_history, project_from_balance, summarize_entity, summarize_portfolio,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReport {
    pub as_of: NaiveDateTime,
    pub summary: EntitySummary,
    pub projection: Vec<MonthRecord>,
    pub history: Vec<MonthRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub as_of: NaiveDateTime,
    pub summary: PortfolioSummary,
    pub projection: Vec<MonthRecord>,
}

pub fn build_entity_report(
    entity: &Entity,
    now: NaiveDateTime,
    months: u32,
    strategy: AccrualStrategy,
) -> EntityReport {
    let summary = summarize_entity(entity, now, strategy);
    let projection = project_from_balance(&entity.params, summary.current_balance, now, months);
    let history = monthly_history(&entity.params, &entity.contributions, now);
    log::debug!(
        "entity report at {now}: {} history months, {} projected months",
        history.len(),
        projection.len()
    );

    EntityReport {
        as_of: now,
        summary,
        projection,
        history,
    }
}

pub fn build_portfolio_report(
    entities: &[Entity],
    now: NaiveDateTime,
    months: u32,
    strategy: AccrualStrategy,
) -> PortfolioReport {
    PortfolioReport {
        as_of: now,
        summary: summarize_portfolio(entities, now, strategy),
        projection: aggregate_projection(entities, now, months, strategy),
    }
}

fn render_row(cells: [&str; 6]) -> String {
    let [index, month, start, interest, contributions, end] = cells;
    format!("{index:<5} {month:<10} {start:>20} {interest:>18} {contributions:>18} {end:>20}\n")
}

fn render_records(title: &str, records: &[MonthRecord]) -> String {
    let mut out = format!("\n{title}\n");
    out.push_str(&render_row(["#", "Month", "Start", "Interest", "Contributions", "End"]));
    for record in records {
        out.push_str(&render_row([
            &record.index.to_string(),
            &record.label,
            &format_currency(record.start_balance),
            &format_currency(record.interest),
            &format_currency(record.contributions),
            &format_currency(record.end_balance),
        ]));
    }
    out
}

fn summary_line(label: &str, value: &str) -> String {
    format!("  {:<19}{value}\n", format!("{label}:"))
}

pub fn render_entity_report(name: &str, report: &EntityReport) -> String {
    let summary = &report.summary;
    let mut out = format!("{name} as of {}\n", report.as_of.format("%Y-%m-%d %H:%M"));
    for (label, amount) in [
        ("Current balance", summary.current_balance),
        ("Initial capital", summary.initial_capital),
        ("Contributions", summary.total_contributions),
        ("Interest earned", summary.interest_earned),
    ] {
        out.push_str(&summary_line(label, &format_currency(amount)));
    }
    out.push_str(&summary_line(
        "Rates",
        &format!(
            "{:.4}% daily, {:.4}% monthly",
            summary.daily_rate_pct, summary.monthly_rate_pct
        ),
    ));
    if summary.savings_goal > 0.0 {
        out.push_str(&summary_line(
            "Goal",
            &format!(
                "{} ({:.1}%, {} remaining)",
                format_currency(summary.savings_goal),
                summary.goal_progress_pct,
                format_currency(summary.remaining_to_goal)
            ),
        ));
    }
    if let Some(last) = summary.last_contribution_at {
        out.push_str(&summary_line(
            "Last contribution",
            &last.format("%Y-%m-%d").to_string(),
        ));
    }

    out.push_str(&render_records("Projection", &report.projection));
    out.push_str(&render_records("History", &report.history));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Contribution, EntityParams, current_balance};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
    }

    fn sample_entity() -> Entity {
        Entity {
            params: EntityParams {
                initial_capital: 100_000.0,
                annual_interest_rate: 4.0,
                created_at: at(2025, 8, 20),
                savings_goal: 250_000.0,
            },
            contributions: vec![Contribution::new(20_000.0, at(2025, 9, 1))],
        }
    }

    #[test]
    fn entity_report_projects_from_the_summary_balance() {
        let entity = sample_entity();
        let now = at(2025, 10, 18);
        let report = build_entity_report(&entity, now, 12, AccrualStrategy::Daily);

        assert_eq!(
            report.summary.current_balance,
            current_balance(&entity.params, &entity.contributions, now)
        );
        assert_eq!(report.projection.len(), 12);
        assert_eq!(report.projection[0].start_balance, report.summary.current_balance);
        assert_eq!(report.history.len(), 3);
        assert_eq!(report.history[1].contributions, 20_000.0);
    }

    #[test]
    fn entity_report_serialization_contains_expected_fields() {
        let report = build_entity_report(&sample_entity(), at(2025, 10, 18), 2, AccrualStrategy::Daily);
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains("\"asOf\""));
        assert!(json.contains("\"currentBalance\""));
        assert!(json.contains("\"goalProgressPct\""));
        assert!(json.contains("\"startBalance\""));
        assert!(json.contains("\"endBalance\""));
        assert!(json.contains("\"label\":\"ago 2025\""));
    }

    #[test]
    fn rendered_report_lists_both_tables() {
        let report = build_entity_report(&sample_entity(), at(2025, 10, 18), 2, AccrualStrategy::Daily);
        let text = render_entity_report("Ahorro BCR", &report);
        assert!(text.starts_with("Ahorro BCR as of 2025-10-18 12:00"));
        assert!(text.contains("Initial capital:   ₡100\u{a0}000,00"));
        assert!(text.contains("Goal:              ₡250\u{a0}000,00"));
        assert!(text.contains("Last contribution: 2025-09-01"));
        assert!(text.contains("\nProjection\n"));
        assert!(text.contains("\nHistory\n"));
        assert!(text.contains("nov 2025"));
        assert!(text.contains("sept 2025"));
    }

    #[test]
    fn portfolio_report_carries_summary_and_projection() {
        let report = build_portfolio_report(&[sample_entity()], at(2025, 10, 18), 3, AccrualStrategy::Segmented);
        assert_eq!(report.summary.entity_count, 1);
        assert_eq!(report.projection.len(), 3);
    }
}
