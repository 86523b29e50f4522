use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    Advice, EngineConfig, Goal, GoalKind, GoalStatus, Granularity, Holding,
    ProjectionInput, ProjectionOptions, RiskProfile, Simulation, ValueMode, WhatIfOverrides,
    evaluate_goal_status, generate_scenarios, goal_advice, project_timeline_with,
    rebalance_report, recommend_allocation, run_what_if,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGranularity {
    Yearly,
    Monthly,
}

impl From<CliGranularity> for Granularity {
    fn from(value: CliGranularity) -> Self {
        match value {
            CliGranularity::Yearly => Granularity::Yearly,
            CliGranularity::Monthly => Granularity::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliValueMode {
    Nominal,
    Real,
}

impl From<CliValueMode> for ValueMode {
    fn from(value: CliValueMode) -> Self {
        match value {
            CliValueMode::Nominal => ValueMode::Nominal,
            CliValueMode::Real => ValueMode::Real,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGranularity {
    #[serde(alias = "year", alias = "annual")]
    Yearly,
    #[serde(alias = "month")]
    Monthly,
}

impl From<ApiGranularity> for CliGranularity {
    fn from(value: ApiGranularity) -> Self {
        match value {
            ApiGranularity::Yearly => CliGranularity::Yearly,
            ApiGranularity::Monthly => CliGranularity::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiValueMode {
    Nominal,
    #[serde(alias = "inflation-adjusted", alias = "inflationAdjusted")]
    Real,
}

impl From<ApiValueMode> for CliValueMode {
    fn from(value: ApiValueMode) -> Self {
        match value {
            ApiValueMode::Nominal => CliValueMode::Nominal,
            ApiValueMode::Real => CliValueMode::Real,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    #[serde(alias = "years")]
    horizon_years: Option<u32>,
    granularity: Option<ApiGranularity>,
    value_mode: Option<ApiValueMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OverridesPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    horizon_years: Option<u32>,
}

impl From<OverridesPayload> for WhatIfOverrides {
    fn from(value: OverridesPayload) -> Self {
        WhatIfOverrides {
            initial_amount: value.initial_amount,
            monthly_contribution: value.monthly_contribution,
            annual_return_rate: value.annual_return_rate.map(|v| v / 100.0),
            inflation_rate: value.inflation_rate.map(|v| v / 100.0),
            horizon_years: value.horizon_years,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WhatIfPayload {
    scenario_name: Option<String>,
    base: ProjectionPayload,
    overrides: OverridesPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalPayload {
    name: Option<String>,
    #[serde(default)]
    kind: GoalKind,
    target_amount: f64,
    #[serde(default, alias = "currentSavings")]
    current_amount: f64,
    #[serde(default)]
    monthly_contribution: f64,
    #[serde(alias = "targetDate")]
    deadline: NaiveDate,
    risk_profile: Option<String>,
    expected_return_rate: Option<f64>,
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioPayload {
    risk_profile: Option<String>,
    #[serde(default)]
    holdings: Vec<Holding>,
}

#[derive(Parser, Debug)]
#[command(
    name = "wealthpath",
    about = "Goal projection, scenario and allocation rebalancing engine"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Serve the JSON API over HTTP")]
    Serve(ServeArgs),
    #[command(about = "Print a projection as JSON")]
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Return-rate spread for pessimistic/optimistic scenarios in percentage points"
    )]
    scenario_spread: f64,
    #[arg(
        long,
        default_value_t = 85.0,
        help = "Fixed confidence score reported on expected projections"
    )]
    confidence_score: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Smallest rebalance trade in percent of portfolio value"
    )]
    rebalance_threshold: f64,
    #[arg(
        long,
        default_value_t = 70.0,
        help = "Progress percent that counts as on track"
    )]
    on_track_percent: f64,
    #[arg(
        long,
        default_value_t = 30.0,
        help = "Minimum progress percent for an at-risk goal near its deadline"
    )]
    at_risk_percent: f64,
    #[arg(long, default_value_t = 60, help = "Days before a deadline that count as near")]
    near_deadline_days: i64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Assumed annual return for conservative goals in percent"
    )]
    conservative_return: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Assumed annual return for moderate goals in percent"
    )]
    moderate_return: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Assumed annual return for aggressive goals in percent"
    )]
    aggressive_return: f64,
}

#[derive(Args, Debug, Clone)]
struct ProjectArgs {
    #[arg(long, default_value_t = 0.0)]
    initial_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_contribution: f64,
    #[arg(long, help = "Expected annual return in percent, e.g. 7")]
    annual_return_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Expected annual inflation in percent")]
    inflation_rate: f64,
    #[arg(long)]
    horizon_years: u32,
    #[arg(long, value_enum, default_value_t = CliGranularity::Yearly)]
    granularity: CliGranularity,
    #[arg(long, value_enum, default_value_t = CliValueMode::Nominal)]
    value_mode: CliValueMode,
    #[arg(long, help = "Also print pessimistic and optimistic scenarios")]
    scenarios: bool,
}

#[derive(Debug)]
struct ProjectionRequest {
    input: ProjectionInput,
    options: ProjectionOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalResponse {
    #[serde(flatten)]
    status: GoalStatus,
    advice: Vec<Advice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    matches: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type SharedConfig = Arc<EngineConfig>;

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve(args) => {
            let port = args.port;
            let config = build_engine_config(args)?;
            run_http_server(config, port)
                .await
                .map_err(|e| format!("Server error: {e}"))
        }
        Command::Project(args) => {
            let with_scenarios = args.scenarios;
            let request = build_projection_request(args)?;
            let config = EngineConfig::default();
            let encoded = if with_scenarios {
                let set = generate_scenarios(&request.input, request.options, &config)
                    .map_err(|e| e.to_string())?;
                serde_json::to_string_pretty(&set)
            } else {
                let result = project_timeline_with(&request.input, request.options, &config)
                    .map_err(|e| e.to_string())?;
                serde_json::to_string_pretty(&result)
            };
            let json = encoded.map_err(|e| format!("Failed to encode projection: {e}"))?;
            println!("{json}");
            Ok(())
        }
    }
}

fn build_engine_config(args: ServeArgs) -> Result<EngineConfig, String> {
    let config = EngineConfig {
        scenario_spread: args.scenario_spread / 100.0,
        confidence_score: args.confidence_score,
        rebalance_threshold: args.rebalance_threshold / 100.0,
        on_track_percent: args.on_track_percent,
        at_risk_percent: args.at_risk_percent,
        near_deadline_days: args.near_deadline_days,
        conservative_return: args.conservative_return / 100.0,
        moderate_return: args.moderate_return / 100.0,
        aggressive_return: args.aggressive_return / 100.0,
    };
    config
        .validate()
        .map_err(|e| format!("invalid engine configuration: {e}"))?;
    Ok(config)
}

fn build_projection_request(args: ProjectArgs) -> Result<ProjectionRequest, String> {
    if !args.annual_return_rate.is_finite() || args.annual_return_rate <= -100.0 {
        return Err("--annual-return-rate must be > -100".to_string());
    }
    if !args.inflation_rate.is_finite() || args.inflation_rate <= -100.0 {
        return Err("--inflation-rate must be > -100".to_string());
    }
    if args.horizon_years == 0 {
        return Err("--horizon-years must be > 0".to_string());
    }

    let input = ProjectionInput {
        initial_amount: args.initial_amount,
        monthly_contribution: args.monthly_contribution,
        annual_return_rate: args.annual_return_rate / 100.0,
        inflation_rate: args.inflation_rate / 100.0,
        horizon_years: args.horizon_years,
    };
    input.validate().map_err(|e| e.to_string())?;

    Ok(ProjectionRequest {
        input,
        options: ProjectionOptions {
            granularity: args.granularity.into(),
            value_mode: args.value_mode.into(),
        },
    })
}

pub async fn run_http_server(config: EngineConfig, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!("wealthpath API listening on http://{addr}");

    axum::serve(listener, app).await
}

fn router(config: SharedConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/scenarios", post(scenarios_handler))
        .route("/api/what-if", post(what_if_handler))
        .route("/api/goals/status", post(goal_status_handler))
        .route("/api/allocation", post(allocation_handler))
        .route("/api/rebalance", post(rebalance_handler))
        .route("/api/simulations/verify", post(verify_simulation_handler))
        .fallback(not_found_handler)
        .with_state(config)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(
    State(config): State<SharedConfig>,
    Query(payload): Query<ProjectionPayload>,
) -> Response {
    projection_handler_impl(&config, payload)
}

async fn projection_post_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<ProjectionPayload>,
) -> Response {
    projection_handler_impl(&config, payload)
}

fn projection_handler_impl(config: &EngineConfig, payload: ProjectionPayload) -> Response {
    let request = match projection_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };
    debug!("projection request: {:?}", request.input);
    match project_timeline_with(&request.input, request.options, config) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn scenarios_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<ProjectionPayload>,
) -> Response {
    let request = match projection_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };
    match generate_scenarios(&request.input, request.options, &config) {
        Ok(set) => json_response(StatusCode::OK, set),
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn what_if_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<WhatIfPayload>,
) -> Response {
    let name = payload
        .scenario_name
        .unwrap_or_else(|| "what-if".to_string());
    let request = match projection_request_from_payload(payload.base) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };
    let overrides = WhatIfOverrides::from(payload.overrides);
    match run_what_if(&name, &request.input, &overrides, request.options, &config) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn goal_status_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<GoalPayload>,
) -> Response {
    let (goal, as_of) = match goal_from_payload(payload) {
        Ok(parsed) => parsed,
        Err(msg) => return bad_request(&msg),
    };
    match evaluate_goal_status(&goal, as_of, &config) {
        Ok(status) => {
            let advice = goal_advice(&goal, status.months_remaining);
            json_response(StatusCode::OK, GoalResponse { status, advice })
        }
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn allocation_handler(Json(payload): Json<PortfolioPayload>) -> Response {
    let profile = match risk_profile_from(payload.risk_profile.as_deref()) {
        Ok(profile) => profile,
        Err(msg) => return bad_request(&msg),
    };
    match recommend_allocation(profile, &payload.holdings) {
        Ok(recommendation) => json_response(StatusCode::OK, recommendation),
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn rebalance_handler(
    State(config): State<SharedConfig>,
    Json(payload): Json<PortfolioPayload>,
) -> Response {
    let profile = match risk_profile_from(payload.risk_profile.as_deref()) {
        Ok(profile) => profile,
        Err(msg) => return bad_request(&msg),
    };
    match rebalance_report(&payload.holdings, profile, &config) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(e) => bad_request(&e.to_string()),
    }
}

async fn verify_simulation_handler(
    State(config): State<SharedConfig>,
    Json(simulation): Json<Simulation>,
) -> Response {
    match simulation.verify(&config) {
        Ok(matches) => {
            if !matches {
                warn!("stored simulation no longer reproduces its results");
            }
            json_response(StatusCode::OK, VerifyResponse { matches })
        }
        Err(e) => bad_request(&e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn bad_request(msg: &str) -> Response {
    warn!("rejected request: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn risk_profile_from(raw: Option<&str>) -> Result<RiskProfile, String> {
    match raw {
        None => Ok(RiskProfile::default()),
        Some(name) => name.parse().map_err(|e: crate::core::EngineError| e.to_string()),
    }
}

fn goal_from_payload(payload: GoalPayload) -> Result<(Goal, NaiveDate), String> {
    let risk_profile = risk_profile_from(payload.risk_profile.as_deref())?;
    let goal = Goal {
        name: payload.name,
        kind: payload.kind,
        target_amount: payload.target_amount,
        current_amount: payload.current_amount,
        monthly_contribution: payload.monthly_contribution,
        deadline: payload.deadline,
        risk_profile,
        expected_annual_return: payload.expected_return_rate.map(|v| v / 100.0),
    };
    goal.validate().map_err(|e| e.to_string())?;
    let as_of = payload
        .as_of
        .unwrap_or_else(|| Local::now().date_naive());
    Ok((goal, as_of))
}

#[cfg(test)]
fn projection_request_from_json(json: &str) -> Result<ProjectionRequest, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    projection_request_from_payload(payload)
}

fn projection_request_from_payload(
    payload: ProjectionPayload,
) -> Result<ProjectionRequest, String> {
    let mut args = default_projection_args_for_api();

    if let Some(v) = payload.initial_amount {
        args.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return_rate {
        args.annual_return_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.horizon_years {
        args.horizon_years = v;
    }
    if let Some(v) = payload.granularity {
        args.granularity = v.into();
    }
    if let Some(v) = payload.value_mode {
        args.value_mode = v.into();
    }

    build_projection_request(args)
}

fn default_projection_args_for_api() -> ProjectArgs {
    ProjectArgs {
        initial_amount: 10_000.0,
        monthly_contribution: 500.0,
        annual_return_rate: 7.0,
        inflation_rate: 3.0,
        horizon_years: 10,
        granularity: CliGranularity::Yearly,
        value_mode: CliValueMode::Nominal,
        scenarios: false,
    }
}
