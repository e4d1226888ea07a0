//! Healix: symptom-driven chronic-disease risk screening.
//!
//! Main entry point for the web server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healix::adapters::sanitize::SanitizingMakeWriter;
use healix::adapters::{
    DisabledAlerts, MockExtractor, OpenAiExtractor, RiskModels, SqliteStorage, TwilioSms,
};
use healix::application::{AccountService, AlertDispatcher, AlertPolicy, PredictionService};
use healix::config::Config;
use healix::http::{router, AppState, SessionStore};
use healix::ports::{AlertSender, SymptomExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stdout unless HEALIX_LOG_MODE=file.
    let use_file = std::env::var("HEALIX_LOG_MODE").is_ok_and(|mode| mode == "file");

    let (writer, _guard) = if use_file {
        let log_file =
            std::env::var("HEALIX_LOG_FILE").unwrap_or_else(|_| "healix.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Healix...");

    let config = Config::from_env()?;
    let storage = Arc::new(
        SqliteStorage::new(&config.db_path)
            .with_context(|| format!("Failed to open database {:?}", config.db_path))?,
    );

    let models = if config.model_dir.exists() {
        RiskModels::load(&config.model_dir)
            .with_context(|| format!("Failed to load models from {:?}", config.model_dir))?
    } else {
        tracing::warn!(
            "Model directory {:?} not found; using built-in parameters",
            config.model_dir
        );
        RiskModels::builtin()?
    };

    let extractor: Arc<dyn SymptomExtractor> = match &config.openai {
        Some(settings) => {
            tracing::info!("Symptom extraction via {}", settings.model);
            Arc::new(
                OpenAiExtractor::new(settings.api_key.clone(), config.http_timeout)?
                    .model(settings.model.clone())
                    .base_url(settings.base_url.clone()),
            )
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; using mock symptom extraction");
            Arc::new(MockExtractor::new())
        }
    };

    let sender: Arc<dyn AlertSender> = match &config.twilio {
        Some(credentials) => Arc::new(TwilioSms::new(credentials.clone(), config.http_timeout)?),
        None => {
            tracing::warn!("Twilio not configured; SMS alerts disabled");
            Arc::new(DisabledAlerts)
        }
    };
    let alerts = Arc::new(AlertDispatcher::new(
        sender,
        AlertPolicy::new(config.public_url_file.clone()),
    ));

    let state = Arc::new(AppState {
        predictions: PredictionService::new(extractor, Arc::new(models), storage.clone(), alerts),
        accounts: AccountService::new(storage),
        sessions: SessionStore::new(),
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    tracing::info!("Healix shutdown complete.");
    Ok(())
}
