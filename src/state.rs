use std::sync::Arc;

use anyhow::Context;

use crate::{
    assignment::AssignmentService,
    mail::EmailConfig,
    module::ModuleRepository,
    preference::PreferenceStore,
    reminder::{ReminderScheduler, ReminderStore, DEFAULT_REMINDER_CRON},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub assignment_service: AssignmentService,
    pub module_repository: ModuleRepository,
    pub preference_store: Arc<dyn PreferenceStore>,
    pub reminder_store: Arc<dyn ReminderStore>,
    pub reminder_scheduler: ReminderScheduler,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub reminder_cron: String,
    pub dispatch_concurrency: usize,
    pub run_on_startup: bool,
    pub client_url: String,
    pub email: Option<EmailConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            reminder_cron: std::env::var("REMINDER_CRON_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_REMINDER_CRON.to_string()),
            dispatch_concurrency: std::env::var("REMINDER_DISPATCH_CONCURRENCY")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("REMINDER_DISPATCH_CONCURRENCY must be a number")?,
            run_on_startup: std::env::var("REMINDER_RUN_ON_STARTUP")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            email: EmailConfig::from_env(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
