mod calendar;
mod currency;
mod engine;
mod summary;
mod types;

pub use calendar::MonthKey;
pub use currency::format_currency;
pub use engine::{
    DEFAULT_PROJECTION_MONTHS, PROJECTION_DAYS_PER_MONTH, current_balance,
    current_balance_segmented, current_balance_with, monthly_history, project_forward,
    project_from_balance,
};
pub use summary::{aggregate_projection, summarize_entity, summarize_portfolio};
pub use types::{
    AccrualStrategy, Contribution, Entity, EntityParams, EntitySummary, MonthRecord,
    PortfolioSummary,
};
