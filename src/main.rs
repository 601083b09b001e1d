use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;

use scribeflow::application::activities::pipeline_executor;
use scribeflow::application::orchestration::{OrchestrationClient, OrchestrationEngine};
use scribeflow::application::ports::{HistoryStore, TranscriptionService};
use scribeflow::application::services::{
    PipelineScheduler, RecordingSubmissionService, SubmissionSettings, TranscriptionPipeline,
};
use scribeflow::infrastructure::observability::{TracingConfig, init_tracing};
use scribeflow::infrastructure::persistence::{InMemoryHistoryStore, PgHistoryStore, create_pool};
use scribeflow::infrastructure::speech::AzureSpeechClient;
use scribeflow::infrastructure::storage::ObjectStoreGatewayFactory;
use scribeflow::presentation::config::DatabaseSettings;
use scribeflow::presentation::{AppState, Environment, Settings, create_router};

async fn history_store(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn HistoryStore>> {
    if settings.url.is_some() {
        let pool = create_pool(settings).await?;
        let store = PgHistoryStore::new(pool);
        store.migrate().await?;
        return Ok(Arc::new(store));
    }

    tracing::warn!(
        retention = settings.in_memory_retention,
        "No database configured, run history will not survive restarts \
         and only the most recent finished runs are kept"
    );
    Ok(Arc::new(InMemoryHistoryStore::with_retention(
        settings.in_memory_retention,
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging));

    let speech: Arc<dyn TranscriptionService> = Arc::new(AzureSpeechClient::new(
        &settings.speech.base_uri,
        &settings.speech.api_token,
    ));
    let gateway = ObjectStoreGatewayFactory::create(&settings.storage)?;
    let store = history_store(&settings.database).await?;

    let executor = Arc::new(pipeline_executor(
        Arc::clone(&speech),
        Arc::clone(&gateway),
        settings.pipeline.retry_policy(),
    ));
    let engine = Arc::new(OrchestrationEngine::new(store, executor));
    let client = Arc::new(OrchestrationClient::new(
        engine,
        Arc::new(TranscriptionPipeline),
    ));

    let resumed = client.resume_incomplete().await?;
    if resumed > 0 {
        tracing::info!(resumed, "Resumed interrupted runs");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = PipelineScheduler::new(
        Arc::clone(&client),
        settings.pipeline.poll_interval(),
        shutdown_rx,
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    let submission_service = Arc::new(RecordingSubmissionService::new(
        speech,
        gateway,
        SubmissionSettings {
            locale: settings.speech.locale.clone(),
            description: settings.speech.description.clone(),
            policy_name: settings.storage.policy_name.clone(),
        },
    ));

    let state = AppState {
        orchestration_client: client,
        submission_service,
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    shutdown_tx.send(true).ok();
    scheduler_handle.await?;

    Ok(())
}
