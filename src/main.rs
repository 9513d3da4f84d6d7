use anyhow::Result;
use content_localizer::orchestrator::Orchestrator;
use content_localizer::{claude::ClaudeClient, deepl::DeepLClient};
use content_localizer::{Config, ContentStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Backlog worker: drains every pending translation task once and exits.
/// Intended to run as a periodic job; successful passes close their tasks,
/// failed ones leave them pending for the next run.
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_localizer=info".parse()?),
        )
        .init();

    info!("Starting translation backlog worker");

    let config = Config::from_env()?;
    let store = Arc::new(ContentStore::new(&config.database_path)?);

    let deepl = DeepLClient::new(
        config.deepl_api_key.clone(),
        config.deepl_api_url.clone(),
        config.request_timeout,
    )?;
    let claude = ClaudeClient::new(
        config.claude_api_key.clone(),
        config.claude_api_url.clone(),
        config.claude_model.clone(),
        config.request_timeout,
    )?;
    if !deepl.is_configured() && !claude.is_configured() {
        info!("No translation provider configured; tasks will remain pending");
    }

    let orchestrator = Orchestrator::new(store, deepl, claude, config.auto_translate);
    let tracker = orchestrator.tracker();

    let before = tracker.stats()?;
    info!(
        "Task backlog: {} pending, {} in progress, {} done",
        before.pending, before.in_progress, before.done
    );

    // One run per entity covers all of its target languages, so collapse
    // the pending tasks down to distinct entities first.
    let pending = tracker.list_pending()?;
    let entities: HashSet<_> = pending
        .iter()
        .map(|t| (t.entity_type, t.entity_id, t.source_lang))
        .collect();

    for (entity_type, entity_id, source) in entities {
        orchestrator
            .translate_entity(entity_type, entity_id, source)
            .await;
    }

    let after = tracker.stats()?;
    info!(
        "Backlog drained: {} tasks closed, {} still pending",
        after.done.saturating_sub(before.done),
        after.pending
    );
    Ok(())
}
