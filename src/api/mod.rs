mod error;
mod payload;
mod report;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub use error::{ApiError, ApiResult};
pub use payload::{
    ContributionPayload, EntityPayload, EntityRequest, MAX_PROJECTION_MONTHS, PortfolioRequest,
    parse_timestamp, parse_utc_offset,
};
pub use report::{
    EntityReport, PortfolioReport, build_entity_report, build_portfolio_report,
    render_entity_report,
};

use crate::core::{
    AccrualStrategy, Entity, MonthRecord, current_balance_with, monthly_history,
    project_from_balance,
};
use payload::{evaluation_instant, projection_months};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliAccrual {
    Daily,
    Segmented,
}

impl From<CliAccrual> for AccrualStrategy {
    fn from(value: CliAccrual) -> Self {
        match value {
            CliAccrual::Daily => AccrualStrategy::Daily,
            CliAccrual::Segmented => AccrualStrategy::Segmented,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiAccrual {
    #[serde(alias = "day-by-day", alias = "iterative")]
    Daily,
    #[serde(alias = "closed-form", alias = "closedForm")]
    Segmented,
}

impl From<ApiAccrual> for AccrualStrategy {
    fn from(value: ApiAccrual) -> Self {
        match value {
            ApiAccrual::Daily => AccrualStrategy::Daily,
            ApiAccrual::Segmented => AccrualStrategy::Segmented,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub utc_offset: FixedOffset,
    pub accrual: AccrualStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            accrual: AccrualStrategy::Daily,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "investpro",
    about = "Daily-compounding savings balances, forward projections and monthly history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve(ServeArgs),
    /// Print the balance, projection and history of one entity file
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    #[arg(
        long,
        env = "INVESTPRO_UTC_OFFSET",
        default_value = "+00:00",
        allow_hyphen_values = true,
        value_parser = parse_utc_offset,
        help = "UTC offset that defines calendar days, e.g. -06:00"
    )]
    pub utc_offset: FixedOffset,
    #[arg(
        long,
        env = "INVESTPRO_ACCRUAL",
        value_enum,
        default_value_t = CliAccrual::Daily,
        help = "Balance accrual: day-by-day or segmented closed form"
    )]
    pub accrual: CliAccrual,
}

impl From<&EngineArgs> for EngineConfig {
    fn from(args: &EngineArgs) -> Self {
        Self {
            utc_offset: args.utc_offset,
            accrual: args.accrual.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "INVESTPRO_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(help = "JSON file with one entity and its contributions")]
    pub entity_file: PathBuf,
    #[arg(long, help = "Evaluation instant, defaults to now")]
    pub as_of: Option<String>,
    #[arg(long, help = "Projected months, defaults to 12")]
    pub months: Option<u32>,
    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug)]
struct ResolvedEntity {
    entity: Entity,
    now: NaiveDateTime,
    months: u32,
    strategy: AccrualStrategy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    as_of: NaiveDateTime,
    current_balance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    as_of: NaiveDateTime,
    months: u32,
    records: Vec<MonthRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    as_of: NaiveDateTime,
    records: Vec<MonthRecord>,
}

pub async fn run(cli: Cli) -> ApiResult<()> {
    match cli.command {
        Command::Serve(args) => run_http_server(args.listen, EngineConfig::from(&args.engine)).await,
        Command::Report(args) => run_report(args),
    }
}

pub fn app_router(config: EngineConfig) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/entity/balance", post(balance_handler))
        .route("/api/entity/projection", post(projection_handler))
        .route("/api/entity/history", post(history_handler))
        .route("/api/entity/report", post(entity_report_handler))
        .route("/api/portfolio", post(portfolio_handler))
        .fallback(not_found_handler)
        .with_state(config)
}

pub async fn run_http_server(addr: SocketAddr, config: EngineConfig) -> ApiResult<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!(
        "investpro API listening on http://{addr} (utc offset {}, {:?} accrual)",
        config.utc_offset,
        config.accrual
    );

    axum::serve(listener, app_router(config)).await?;
    Ok(())
}

fn run_report(args: ReportArgs) -> ApiResult<()> {
    let raw = std::fs::read_to_string(&args.entity_file).map_err(|source| ApiError::ReadFile {
        path: args.entity_file.clone(),
        source,
    })?;
    let mut request: EntityRequest =
        serde_json::from_str(&raw).map_err(|e| ApiError::BadJson(e.to_string()))?;
    if args.as_of.is_some() {
        request.as_of = args.as_of;
    }
    if args.months.is_some() {
        request.months = args.months;
    }

    let name = request.entity.label().to_string();
    let resolved = resolve_entity_request(EngineConfig::from(&args.engine), request)?;
    let report = build_entity_report(
        &resolved.entity,
        resolved.now,
        resolved.months,
        resolved.strategy,
    );

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(ApiError::Encode)?;
        println!("{json}");
    } else {
        print!("{}", render_entity_report(&name, &report));
    }
    Ok(())
}

fn resolve_entity_request(config: EngineConfig, request: EntityRequest) -> ApiResult<ResolvedEntity> {
    let now = evaluation_instant(request.as_of.as_deref(), &config.utc_offset)?;
    let months = projection_months(request.months)?;
    let strategy = request.accrual.map(Into::into).unwrap_or(config.accrual);
    let entity = request.entity.into_entity(&config.utc_offset)?;

    Ok(ResolvedEntity {
        entity,
        now,
        months,
        strategy,
    })
}

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadJson(rejection.body_text()))
}

fn respond<T: Serialize>(result: ApiResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => err.into_response(),
    }
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn balance_handler(
    State(config): State<EngineConfig>,
    payload: Result<Json<EntityRequest>, JsonRejection>,
) -> Response {
    respond(decode(payload).and_then(|request| {
        let resolved = resolve_entity_request(config, request)?;
        Ok(BalanceResponse {
            as_of: resolved.now,
            current_balance: current_balance_with(
                resolved.strategy,
                &resolved.entity.params,
                &resolved.entity.contributions,
                resolved.now,
            ),
        })
    }))
}

async fn projection_handler(
    State(config): State<EngineConfig>,
    payload: Result<Json<EntityRequest>, JsonRejection>,
) -> Response {
    respond(decode(payload).and_then(|request| {
        let resolved = resolve_entity_request(config, request)?;
        let balance = current_balance_with(
            resolved.strategy,
            &resolved.entity.params,
            &resolved.entity.contributions,
            resolved.now,
        );
        Ok(ProjectionResponse {
            as_of: resolved.now,
            months: resolved.months,
            records: project_from_balance(
                &resolved.entity.params,
                balance,
                resolved.now,
                resolved.months,
            ),
        })
    }))
}

async fn history_handler(
    State(config): State<EngineConfig>,
    payload: Result<Json<EntityRequest>, JsonRejection>,
) -> Response {
    respond(decode(payload).and_then(|request| {
        let resolved = resolve_entity_request(config, request)?;
        Ok(HistoryResponse {
            as_of: resolved.now,
            records: monthly_history(
                &resolved.entity.params,
                &resolved.entity.contributions,
                resolved.now,
            ),
        })
    }))
}

async fn entity_report_handler(
    State(config): State<EngineConfig>,
    payload: Result<Json<EntityRequest>, JsonRejection>,
) -> Response {
    respond(decode(payload).and_then(|request| {
        let resolved = resolve_entity_request(config, request)?;
        Ok(build_entity_report(
            &resolved.entity,
            resolved.now,
            resolved.months,
            resolved.strategy,
        ))
    }))
}

async fn portfolio_handler(
    State(config): State<EngineConfig>,
    payload: Result<Json<PortfolioRequest>, JsonRejection>,
) -> Response {
    respond(decode(payload).and_then(|request| {
        let now = evaluation_instant(request.as_of.as_deref(), &config.utc_offset)?;
        let months = projection_months(request.months)?;
        let strategy = request.accrual.map(Into::into).unwrap_or(config.accrual);
        let entities = request
            .entities
            .into_iter()
            .map(|entity| entity.into_entity(&config.utc_offset))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(build_portfolio_report(&entities, now, months, strategy))
    }))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
