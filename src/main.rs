use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use test_triage::config::AppConfig;
use test_triage::error::AppError;
use test_triage::telemetry;
use test_triage::triage::catalog::{FactorCatalog, FactorKey, GATE_NO, GATE_YES};
use test_triage::triage::import::CsvTestImporter;
use test_triage::triage::report::{build_tier_report, text};
use test_triage::triage::{triage_router, TestDraft, TestRepository, TriageState};
use tracing::info;

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Test Automation Triage",
    about = "Rank manual QA tests by automation value from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a prioritization report to stdout
    Report(ReportArgs),
    /// Print the scoring guide for the standard rubric
    Guide,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// CSV export to import before building the report
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Restrict the report to one section
    #[arg(long)]
    section: Option<String>,
    /// Seed a small demo backlog when no CSV is supplied
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Report(args) => run_report(args),
        Command::Guide => {
            println!("{}", text::scoring_guide(&FactorCatalog::standard()));
            Ok(())
        }
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = TestRepository::new(Arc::new(FactorCatalog::standard()));
    let triage_state = Arc::new(TriageState::new(repository));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state)
        .merge(triage_router(triage_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "test triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        csv,
        section,
        seed_demo,
    } = args;

    let mut repository = TestRepository::new(Arc::new(FactorCatalog::standard()));

    match csv {
        Some(path) => {
            let count = CsvTestImporter::from_path(path, &mut repository, false)?;
            info!(count, "imported tests from CSV");
        }
        None if seed_demo => seed_demo_backlog(&mut repository),
        None => {}
    }

    let section = section.as_deref();
    let tests = repository.get_sorted(section);
    let tiers = repository.priority_tiers(section);
    let report = build_tier_report(&tests, &tiers, repository.catalog());

    println!("{}", text::render_report(&report, Local::now()));
    Ok(())
}

/// A handful of representative tests so `report --seed-demo` shows every
/// tier without needing an export file.
fn seed_demo_backlog(repository: &mut TestRepository) {
    let entries: [(&str, &str, &str, [u8; 8]); 6] = [
        (
            "Verify that user can log in with valid credentials",
            "Login",
            "QA-101",
            [GATE_YES, 5, 5, 5, 5, 5, 5, 5],
        ),
        (
            "Check if checkout applies discount codes",
            "Checkout",
            "QA-214",
            [GATE_YES, 5, 5, 3, 3, 5, 3, 5],
        ),
        (
            "Validate dashboard widgets refresh on schedule",
            "Dashboard",
            "QA-150",
            [GATE_YES, 3, 3, 3, 3, 3, 3, 3],
        ),
        (
            "Ensure report filters persist across sessions",
            "Reports",
            "QA-188",
            [GATE_YES, 1, 3, 3, 1, 3, 3, 1],
        ),
        (
            "Confirm profile avatar upload shows a preview",
            "Profile",
            "QA-233",
            [GATE_YES, 1, 1, 1, 1, 1, 1, 1],
        ),
        (
            "Check visual alignment of notification toasts",
            "Notifications",
            "QA-275",
            [GATE_NO, 3, 1, 1, 1, 1, 1, 3],
        ),
    ];

    let keys = [
        "can_be_automated",
        "regression_frequency",
        "customer_impact",
        "manual_effort",
        "automation_complexity",
        "existing_framework",
        "angular_framework",
        "repetitive",
    ];

    for (name, section, ticket_id, values) in entries {
        let scores: BTreeMap<FactorKey, u8> = keys
            .iter()
            .zip(values)
            .map(|(key, value)| (FactorKey::new(*key), value))
            .collect();
        repository.add_test(TestDraft {
            name: name.to_string(),
            section: section.to_string(),
            ticket_id: ticket_id.to_string(),
            scores,
            ..TestDraft::default()
        });
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
