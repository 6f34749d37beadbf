use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

use tutorhub_vetting::config::AppConfig;
use tutorhub_vetting::error::AppError;
use tutorhub_vetting::telemetry;
use tutorhub_vetting::workflows::vetting::{
    vetting_router, ApplicationStatus, BlobStorage, DocumentFile, MemoryBlobStorage,
    MemoryRecordStore, NavigationHost, RecordStore, TeachingMode, TutorProfile,
    TutorVettingService, UserId, VettingWizard, WizardError, WizardStep, DOCUMENTS_BUCKET,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "TutorHub Vetting",
    about = "Run the tutor vetting workflow service from the command line",
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
    /// Walk the vetting wizard end to end against in-memory collaborators
    Demo(DemoArgs),
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

#[derive(Args, Debug)]
struct DemoArgs {
    /// Account identifier to submit the demo application as
    #[arg(long, default_value = "tutor-demo")]
    user_id: String,
    /// Approve the submitted application after the walkthrough
    #[arg(long)]
    approve: bool,
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
        Command::Demo(args) => run_demo(args),
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

    let storage = Arc::new(MemoryBlobStorage::default());
    let records = Arc::new(MemoryRecordStore::default());
    let service = Arc::new(TutorVettingService::new(
        storage,
        records,
        config.storage.documents_bucket.clone(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(vetting_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tutor vetting service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

struct PrintingHost;

impl NavigationHost for PrintingHost {
    fn close(&self) {
        println!("wizard closed");
    }

    fn on_success(&self, redirect: &str) {
        println!("host redirecting to {redirect}");
    }
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let storage = Arc::new(MemoryBlobStorage::default());
    let records = Arc::new(MemoryRecordStore::default());
    let user_id = UserId(args.user_id);

    records.seed_profile(TutorProfile::registered(user_id.clone(), "Naledi Kgosi"));

    let service = Arc::new(TutorVettingService::new(
        storage.clone(),
        records.clone(),
        DOCUMENTS_BUCKET,
    ));
    let mut wizard = VettingWizard::open(user_id.clone(), service);

    println!("Tutor vetting wizard demo ({user_id})");

    fill_demo_draft(&mut wizard);

    while wizard.step() != WizardStep::Review {
        let landed = wizard.advance().map_err(WizardError::from)?;
        println!(
            "step {}/{}: {}",
            landed.index(),
            WizardStep::ALL.len(),
            landed.title()
        );
    }

    let record = wizard.submit(&PrintingHost)?;
    println!(
        "application {} submitted as '{}' with {} document reference(s)",
        record.id,
        record.status.label(),
        record.proof_uploads.reference_count()
    );
    println!("objects in storage: {}", storage.object_count());

    if args.approve {
        records
            .record_review(
                &record.id,
                ApplicationStatus::Approved,
                UserId("reviewer-demo".to_string()),
                None,
            )
            .map_err(|err| AppError::Workflow(WizardError::Submission(err.into())))?;
        let reviewed = records
            .application(&record.id)
            .expect("reviewed record present");
        println!("reviewer decision recorded: {}", reviewed.status.label());
    }

    if let Some(profile) = records.profile(&user_id) {
        let status = profile
            .application_status
            .map(ApplicationStatus::label)
            .unwrap_or("none");
        println!("profile application_status: {status}");
    }

    Ok(())
}

fn fill_demo_draft<S, R>(wizard: &mut VettingWizard<S, R>)
where
    S: BlobStorage + 'static,
    R: RecordStore + 'static,
{
    let draft = wizard.draft_mut();

    draft.personal.full_name = "Naledi Kgosi".to_string();
    draft.personal.phone = "+267 71 234 567".to_string();
    draft.personal.address = "Plot 2140, Gaborone".to_string();
    draft.personal.date_of_birth = NaiveDate::from_ymd_opt(1992, 4, 18);

    draft.education.highest_qualification = "bachelor".to_string();
    draft.education.institution = "University of Botswana".to_string();
    draft.education.graduation_year = Some(2014);
    draft.education.field_of_study = "Mathematics".to_string();
    draft.education.gpa_grade = "First Class".to_string();

    draft.experience.years_of_experience = Some(5);
    draft.experience.teaching_approach = "Worked examples before theory.".to_string();
    draft.experience.subjects_expertise.insert("Mathematics".to_string());
    draft.experience.subjects_expertise.insert("Physics".to_string());
    draft.experience.age_groups.insert("Secondary (13-16 years)".to_string());

    draft
        .availability
        .availability_hours
        .insert("Monday Evening".to_string());
    draft
        .availability
        .availability_hours
        .insert("Saturday Morning".to_string());
    draft.availability.hourly_rate = Some(180.0);
    draft.availability.preferred_mode = Some(TeachingMode::Both);

    draft
        .files
        .education_certificates
        .push(DocumentFile::new("degree.pdf", b"demo degree".to_vec()));
    draft.files.identity_document = Some(DocumentFile::new("omang.jpg", b"demo id".to_vec()));
    draft.files.cv_resume = Some(DocumentFile::new("cv.pdf", b"demo cv".to_vec()));
}
