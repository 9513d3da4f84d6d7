//! Integration tests for the content localization pipeline.
//!
//! These exercise the full write-to-read path: canonical content goes in,
//! the orchestrator translates it through mocked providers, and the
//! resolver serves localized views out of the stored overlays.

use content_localizer::claude::ClaudeClient;
use content_localizer::deepl::DeepLClient;
use content_localizer::model::ArticleOverlay;
use content_localizer::orchestrator::Orchestrator;
use content_localizer::resolver;
use content_localizer::{ContentStore, EntityType, Language, TaskStatus, TaskTracker};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ==================== Test Helpers ====================

fn test_store() -> (Arc<ContentStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("integration.db");
    let store =
        Arc::new(ContentStore::new(db_path.to_str().unwrap()).expect("Failed to create store"));
    (store, temp_dir)
}

fn build_orchestrator(store: Arc<ContentStore>, server: &MockServer) -> Orchestrator {
    let deepl = DeepLClient::new(
        Some("test-key".to_string()),
        format!("{}/v2/translate", server.uri()),
        Duration::from_secs(5),
    )
    .expect("Should build DeepL client");
    let claude = ClaudeClient::new(
        Some("test-key".to_string()),
        format!("{}/v1/messages", server.uri()),
        "claude-haiku-4-5-20251001".to_string(),
        Duration::from_secs(5),
    )
    .expect("Should build Claude client");
    Orchestrator::new(store, deepl, claude, true)
}

fn deepl_response(text: &str) -> serde_json::Value {
    serde_json::json!({ "translations": [ { "text": text } ] })
}

fn claude_response(text: &str) -> serde_json::Value {
    serde_json::json!({ "content": [ { "type": "text", "text": text } ] })
}

async fn mount_deepl(server: &MockServer, contains: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_string_contains(contains))
        .respond_with(ResponseTemplate::new(200).set_body_json(deepl_response(reply)))
        .mount(server)
        .await;
}

async fn mount_claude(server: &MockServer, contains: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains(contains))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_response(reply)))
        .mount(server)
        .await;
}

async fn mount_failures(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(server)
        .await;
}

// ==================== End-to-End Pipeline ====================

/// Full pipeline: create an article, enqueue its tasks, run a translation
/// pass where English succeeds and Portuguese fails on both providers, then
/// read every language back through the resolver.
#[tokio::test]
async fn test_article_pipeline_with_partial_language_failure() {
    let (store, _tmp) = test_store();
    let article_id = store
        .create_article(
            "Spielend lernen",
            "spielend-lernen",
            Some("Ein Auszug"),
            "<p>Kinder lernen im Spiel.</p>",
            None,
            None,
            Some(4),
        )
        .expect("Failed to create article");

    let tracker = TaskTracker::new(store.clone());
    tracker
        .enqueue(EntityType::Article, article_id)
        .expect("Failed to enqueue");
    assert_eq!(tracker.stats().expect("stats").pending, 2);

    let server = MockServer::start().await;
    // English succeeds for short and long fields.
    mount_deepl(&server, "target_lang=EN", "Learning through play").await;
    mount_claude(&server, "English", "<p>Children learn through play.</p>").await;
    // Portuguese hits the catch-all failures on both providers.
    mount_failures(&server).await;

    let orchestrator = build_orchestrator(store.clone(), &server);
    orchestrator
        .translate_entity(EntityType::Article, article_id, Language::De)
        .await;

    // Task ledger: the English task is closed, Portuguese remains open.
    let tasks = store
        .tasks_for_entity(EntityType::Article, article_id)
        .expect("Failed to list tasks");
    let en_task = tasks
        .iter()
        .find(|t| t.target_lang == Language::En)
        .expect("English task should exist");
    let pt_task = tasks
        .iter()
        .find(|t| t.target_lang == Language::Pt)
        .expect("Portuguese task should exist");
    assert_eq!(en_task.status, TaskStatus::Done);
    assert_eq!(pt_task.status, TaskStatus::Pending);

    // Resolver: English serves translated fields, Portuguese falls back to
    // the German canonical content, German serves canonical directly.
    let article = store
        .get_article(article_id)
        .expect("query")
        .expect("exists");
    let overlays = store.article_overlays(article_id).expect("overlays");

    let en = resolver::resolve_article(&article, &overlays, Language::En);
    assert_eq!(en.title, "Learning through play");
    assert_eq!(en.body, "<p>Children learn through play.</p>");
    assert_eq!(en.reading_time_minutes, Some(4));

    let pt = resolver::resolve_article(&article, &overlays, Language::Pt);
    assert_eq!(pt.title, "Spielend lernen");
    assert_eq!(pt.body, "<p>Kinder lernen im Spiel.</p>");

    let de = resolver::resolve_article(&article, &overlays, Language::De);
    assert_eq!(de.title, "Spielend lernen");
}

/// Re-running the pipeline after a partial failure completes the remaining
/// language and leaves the finished one untouched.
#[tokio::test]
async fn test_second_pass_completes_remaining_language() {
    let (store, _tmp) = test_store();
    let article_id = store
        .create_article("Titel", "titel", None, "<p>Text</p>", None, None, None)
        .expect("Failed to create article");
    let tracker = TaskTracker::new(store.clone());
    tracker
        .enqueue(EntityType::Article, article_id)
        .expect("Failed to enqueue");

    // First pass: everything fails.
    let failing = MockServer::start().await;
    mount_failures(&failing).await;
    build_orchestrator(store.clone(), &failing)
        .translate_entity(EntityType::Article, article_id, Language::De)
        .await;
    assert_eq!(tracker.stats().expect("stats").pending, 2);

    // Re-enqueue is a no-op while the tasks are still open.
    tracker
        .enqueue(EntityType::Article, article_id)
        .expect("Failed to re-enqueue");
    assert_eq!(store.tasks_for_entity(EntityType::Article, article_id).expect("list").len(), 2);

    // Second pass: providers recovered.
    let healthy = MockServer::start().await;
    mount_deepl(&healthy, "text=Titel", "Title").await;
    mount_claude(&healthy, "Text", "<p>Translated</p>").await;
    mount_failures(&healthy).await;
    build_orchestrator(store.clone(), &healthy)
        .translate_entity(EntityType::Article, article_id, Language::De)
        .await;

    let stats = tracker.stats().expect("stats");
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.done, 2);
}

// ==================== Manual Overlay + Pipeline Interaction ====================

/// A manually edited overlay field survives a later automated pass that
/// fails on that field: the partial merge never clears stored values.
#[tokio::test]
async fn test_manual_edit_survives_failed_automated_pass() {
    let (store, _tmp) = test_store();
    let article_id = store
        .create_article("Titel", "titel", None, "<p>Text</p>", None, None, None)
        .expect("Failed to create article");

    let mut manual = ArticleOverlay::new(article_id, Language::En);
    manual.title = Some("Hand-polished title".to_string());
    store
        .upsert_article_overlay(&manual)
        .expect("Failed to upsert");

    // Title translation fails everywhere; only the body succeeds.
    let server = MockServer::start().await;
    mount_claude(&server, "Text", "<p>Body EN</p>").await;
    mount_failures(&server).await;
    build_orchestrator(store.clone(), &server)
        .translate_entity(EntityType::Article, article_id, Language::De)
        .await;

    let article = store
        .get_article(article_id)
        .expect("query")
        .expect("exists");
    let overlays = store.article_overlays(article_id).expect("overlays");
    let en = resolver::resolve_article(&article, &overlays, Language::En);
    assert_eq!(en.title, "Hand-polished title");
    assert_eq!(en.body, "<p>Body EN</p>");
}

// ==================== Task Ledger Visibility ====================

#[tokio::test]
async fn test_task_summaries_carry_entity_titles() {
    let (store, _tmp) = test_store();
    let article_id = store
        .create_article("Sichtbarer Titel", "slug", None, "b", None, None, None)
        .expect("Failed to create article");
    let tracker = TaskTracker::new(store.clone());
    tracker
        .enqueue(EntityType::Article, article_id)
        .expect("Failed to enqueue");

    let pending = tracker.list_pending().expect("Failed to list");
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|t| t.entity_title == "Sichtbarer Titel"));
    assert!(pending.iter().all(|t| t.source_lang == Language::De));
}
