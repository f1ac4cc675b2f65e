use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AccrualStrategy {
    #[default]
    Daily,
    Segmented,
}

#[derive(Debug, Clone)]
pub struct EntityParams {
    pub initial_capital: f64,
    pub annual_interest_rate: f64,
    pub created_at: NaiveDateTime,
    pub savings_goal: f64,
}

impl EntityParams {
    pub fn daily_rate_pct(&self) -> f64 {
        self.annual_interest_rate / 365.0
    }

    pub fn monthly_rate_pct(&self) -> f64 {
        self.annual_interest_rate / 12.0
    }

    pub(crate) fn daily_growth_factor(&self) -> f64 {
        1.0 + self.daily_rate_pct() / 100.0
    }
}

#[derive(Debug, Clone)]
pub struct Contribution {
    pub amount: f64,
    pub occurred_at: NaiveDateTime,
    pub note: Option<String>,
}

impl Contribution {
    pub fn new(amount: f64, occurred_at: NaiveDateTime) -> Self {
        Self {
            amount,
            occurred_at,
            note: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub params: EntityParams,
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub index: u32,
    pub label: String,
    pub start_balance: f64,
    pub interest: f64,
    pub contributions: f64,
    pub end_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub current_balance: f64,
    pub initial_capital: f64,
    pub total_contributions: f64,
    pub interest_earned: f64,
    pub savings_goal: f64,
    pub goal_progress_pct: f64,
    pub remaining_to_goal: f64,
    pub daily_rate_pct: f64,
    pub monthly_rate_pct: f64,
    pub last_contribution_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_balance: f64,
    pub total_capital: f64,
    pub total_contributions: f64,
    pub total_interest_earned: f64,
    pub total_goal: f64,
    pub goal_progress_pct: f64,
    pub entity_count: usize,
}
