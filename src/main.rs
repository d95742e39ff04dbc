mod assignment;
mod auth;
mod db;
mod error;
mod mail;
mod middleware;
mod module;
mod preference;
mod reminder;
mod routes;
mod state;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use assignment::{AssignmentRepository, AssignmentService, AssignmentStore};
use db::{create_pool, run_migrations};
use mail::{LogMailer, Mailer, SmtpMailer};
use module::ModuleRepository;
use preference::{PreferenceRepository, PreferenceStore};
use reminder::{DeadlineScanJob, PgReminderStore, ReminderScheduler, ReminderStore, ScanSettings};
use routes::create_router;
use state::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Delay before the optional startup scan, so the server is listening first.
const STARTUP_SCAN_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,deadline_reminders=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await.context("failed to run migrations")?;

    let mailer: Arc<dyn Mailer> = match config.email.clone() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpMailer::new(email_config).context("invalid SMTP configuration")?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, reminder emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // Create repositories
    let reminder_store: Arc<dyn ReminderStore> = Arc::new(PgReminderStore::new(db.clone()));
    let preference_store: Arc<dyn PreferenceStore> = Arc::new(PreferenceRepository::new(db.clone()));
    let assignment_store: Arc<dyn AssignmentStore> = Arc::new(AssignmentRepository::new(db.clone()));
    let module_repository = ModuleRepository::new(db.clone());

    // Create services
    let assignment_service = AssignmentService::new(
        assignment_store,
        preference_store.clone(),
        reminder_store.clone(),
    );

    let scan_job = Arc::new(DeadlineScanJob::new(
        reminder_store.clone(),
        mailer,
        ScanSettings {
            dispatch_concurrency: config.dispatch_concurrency,
            dashboard_url: config.client_url.clone(),
        },
    ));

    let mut reminder_scheduler = ReminderScheduler::start(scan_job, &config.reminder_cron)
        .await
        .context("failed to start reminder scheduler")?;
    tracing::info!(job_id = %reminder_scheduler.job_id(), "Deadline scan registered");

    if config.run_on_startup {
        let startup_scheduler = reminder_scheduler.clone();
        tokio::spawn(async move {
            tokio::time::sleep(STARTUP_SCAN_DELAY).await;
            tracing::info!("Running initial reminder check");
            startup_scheduler.trigger().await;
        });
    }

    // Create application state
    let state = AppState {
        config: config.clone(),
        assignment_service,
        module_repository,
        preference_store,
        reminder_store,
        reminder_scheduler: reminder_scheduler.clone(),
    };

    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reminder_scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
