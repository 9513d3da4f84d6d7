//! Translation-task ledger: what (entity, target language) pairs still owe
//! a translation, and what has already completed.
//!
//! State machine: PENDING → IN_PROGRESS → DONE, plus any→any through the
//! administrative override. The automated pipeline only ever closes tasks
//! (non-DONE → DONE); nothing automated sets IN_PROGRESS.

use crate::language::Language;
use crate::model::{EntityType, TaskStatus, TranslationTask};
use crate::store::ContentStore;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// A task enriched with a human-readable entity title for admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub id: i64,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub entity_title: String,
    pub source_lang: Language,
    pub target_lang: Language,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Task counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub pending: u64,
    pub in_progress: u64,
    pub done: u64,
}

#[derive(Clone)]
pub struct TaskTracker {
    store: Arc<ContentStore>,
}

impl TaskTracker {
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self { store }
    }

    /// Record outstanding translation work for a newly created entity: one
    /// PENDING task per non-default target language.
    ///
    /// Idempotent: a triple that already has a non-DONE task is skipped, so
    /// repeated enqueues (or a re-save before translation lands) never pile
    /// up duplicates.
    pub fn enqueue(&self, entity_type: EntityType, entity_id: i64) -> Result<()> {
        let source = Language::default_lang();
        let existing = self.store.tasks_for_entity(entity_type, entity_id)?;

        for target in Language::targets(source) {
            let outstanding = existing
                .iter()
                .any(|t| t.target_lang == target && t.status != TaskStatus::Done);
            if outstanding {
                continue;
            }
            self.store
                .insert_task(entity_type, entity_id, source, target, TaskStatus::Pending)
                .context("Failed to enqueue translation task")?;
        }
        Ok(())
    }

    pub fn list_pending(&self) -> Result<Vec<TaskSummary>> {
        let tasks = self.store.tasks_by_status(TaskStatus::Pending)?;
        Ok(tasks.into_iter().map(|t| self.summarize(t)).collect())
    }

    pub fn list_all(&self) -> Result<Vec<TaskSummary>> {
        let tasks = self.store.all_tasks()?;
        Ok(tasks.into_iter().map(|t| self.summarize(t)).collect())
    }

    pub fn stats(&self) -> Result<TaskStats> {
        Ok(TaskStats {
            pending: self.store.count_by_status(TaskStatus::Pending)?,
            in_progress: self.store.count_by_status(TaskStatus::InProgress)?,
            done: self.store.count_by_status(TaskStatus::Done)?,
        })
    }

    /// Administrative override: set any status on any task, no transition
    /// checks. Errors only when the task does not exist.
    pub fn set_status(&self, task_id: i64, status: TaskStatus) -> Result<TaskSummary> {
        let updated = self.store.update_task_status(task_id, status)?;
        if !updated {
            anyhow::bail!("Translation task not found: {}", task_id);
        }
        let task = self
            .store
            .get_task(task_id)?
            .context("Task vanished after status update")?;
        Ok(self.summarize(task))
    }

    /// Orchestrator hook: close every non-DONE task for the triple. All
    /// duplicates, if any slipped in, are closed together.
    pub fn close_all(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        target_lang: Language,
    ) -> Result<usize> {
        let closed = self.store.close_tasks(entity_type, entity_id, target_lang)?;
        if closed > 0 {
            info!(
                "Closed {} translation task(s) for {} {} -> {}",
                closed,
                entity_type.as_str(),
                entity_id,
                target_lang
            );
        }
        Ok(closed)
    }

    fn summarize(&self, task: TranslationTask) -> TaskSummary {
        TaskSummary {
            entity_title: self.entity_title(task.entity_type, task.entity_id),
            id: task.id,
            entity_type: task.entity_type,
            entity_id: task.entity_id,
            source_lang: task.source_lang,
            target_lang: task.target_lang,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    /// Human-readable label per entity type. A closed match over the
    /// variant set; store errors degrade to the unknown label since this is
    /// display-only.
    fn entity_title(&self, entity_type: EntityType, entity_id: i64) -> String {
        let title = match entity_type {
            EntityType::Article => self
                .store
                .get_article(entity_id)
                .ok()
                .flatten()
                .map(|a| a.title),
            EntityType::Category => self
                .store
                .get_category(entity_id)
                .ok()
                .flatten()
                .map(|c| c.display_name.unwrap_or(c.name)),
            EntityType::Author => self
                .store
                .get_author(entity_id)
                .ok()
                .flatten()
                .map(|a| a.name),
            EntityType::Tag => self.store.get_tag(entity_id).ok().flatten().map(|t| t.name),
        };
        title.unwrap_or_else(|| entity_type.unknown_label().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_tracker() -> (TaskTracker, Arc<ContentStore>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_tasks.db");
        let store =
            Arc::new(ContentStore::new(db_path.to_str().unwrap()).expect("Failed to create store"));
        (TaskTracker::new(store.clone()), store, temp_dir)
    }

    // ==================== Enqueue Tests ====================

    #[test]
    fn test_enqueue_creates_one_task_per_target() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue");

        let tasks = store.tasks_for_entity(EntityType::Article, 1).expect("list");
        assert_eq!(tasks.len(), 2);
        let targets: Vec<_> = tasks.iter().map(|t| t.target_lang).collect();
        assert!(targets.contains(&Language::En));
        assert!(targets.contains(&Language::Pt));
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(tasks.iter().all(|t| t.source_lang == Language::De));
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue 1");
        tracker.enqueue(EntityType::Article, 1).expect("enqueue 2");

        let tasks = store.tasks_for_entity(EntityType::Article, 1).expect("list");
        assert_eq!(tasks.len(), 2, "Duplicate enqueue must be a no-op");
    }

    #[test]
    fn test_enqueue_recreates_after_done() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue");
        store
            .close_tasks(EntityType::Article, 1, Language::En)
            .expect("close");

        // The EN task is DONE, so a fresh enqueue owes a new EN task but
        // not a second PT one.
        tracker.enqueue(EntityType::Article, 1).expect("enqueue again");

        let tasks = store.tasks_for_entity(EntityType::Article, 1).expect("list");
        assert_eq!(tasks.len(), 3);
        let pending_en = tasks
            .iter()
            .filter(|t| t.target_lang == Language::En && t.status == TaskStatus::Pending)
            .count();
        assert_eq!(pending_en, 1);
    }

    #[test]
    fn test_enqueue_scoped_per_entity() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue");
        tracker.enqueue(EntityType::Category, 1).expect("enqueue");

        assert_eq!(
            store.tasks_for_entity(EntityType::Article, 1).expect("list").len(),
            2
        );
        assert_eq!(
            store.tasks_for_entity(EntityType::Category, 1).expect("list").len(),
            2
        );
    }

    // ==================== Listing and Stats ====================

    #[test]
    fn test_list_pending_excludes_done() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue");
        store
            .close_tasks(EntityType::Article, 1, Language::En)
            .expect("close");

        let pending = tracker.list_pending().expect("list");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].target_lang, Language::Pt);

        let all = tracker.list_all().expect("list all");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_stats_counts_by_status() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue");
        tracker.enqueue(EntityType::Tag, 2).expect("enqueue");
        store
            .close_tasks(EntityType::Tag, 2, Language::Pt)
            .expect("close");

        let stats = tracker.stats().expect("stats");
        assert_eq!(
            stats,
            TaskStats {
                pending: 3,
                in_progress: 0,
                done: 1
            }
        );
    }

    #[test]
    fn test_listing_resolves_entity_titles() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        let article_id = store
            .create_article("Mein Artikel", "mein-artikel", None, "<p>x</p>", None, None, None)
            .expect("create");
        tracker
            .enqueue(EntityType::Article, article_id)
            .expect("enqueue");

        let pending = tracker.list_pending().expect("list");
        assert!(pending.iter().all(|t| t.entity_title == "Mein Artikel"));
    }

    #[test]
    fn test_listing_uses_unknown_label_for_missing_entity() {
        let (tracker, _store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Author, 99).expect("enqueue");

        let pending = tracker.list_pending().expect("list");
        assert!(pending.iter().all(|t| t.entity_title == "Unknown Author"));
    }

    #[test]
    fn test_category_title_prefers_display_name() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        let id = store
            .create_category("bildung", Some("Frühe Bildung"), None, "bildung")
            .expect("create");
        tracker.enqueue(EntityType::Category, id).expect("enqueue");

        let pending = tracker.list_pending().expect("list");
        assert_eq!(pending[0].entity_title, "Frühe Bildung");
    }

    // ==================== Status Override ====================

    #[test]
    fn test_set_status_any_to_any() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        tracker.enqueue(EntityType::Article, 1).expect("enqueue");
        let task_id = store.all_tasks().expect("list")[0].id;

        // Forward and backward transitions, no state machine check.
        let s = tracker.set_status(task_id, TaskStatus::Done).expect("set");
        assert_eq!(s.status, TaskStatus::Done);
        let s = tracker
            .set_status(task_id, TaskStatus::InProgress)
            .expect("set");
        assert_eq!(s.status, TaskStatus::InProgress);
        let s = tracker.set_status(task_id, TaskStatus::Pending).expect("set");
        assert_eq!(s.status, TaskStatus::Pending);
    }

    #[test]
    fn test_set_status_missing_task_errors() {
        let (tracker, _store, _temp_dir) = create_test_tracker();
        let result = tracker.set_status(12345, TaskStatus::Done);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("12345"));
    }

    // ==================== close_all ====================

    #[test]
    fn test_close_all_closes_duplicates() {
        let (tracker, store, _temp_dir) = create_test_tracker();

        // Simulate a duplicate that slipped in outside enqueue.
        store
            .insert_task(EntityType::Article, 1, Language::De, Language::En, TaskStatus::Pending)
            .expect("insert");
        store
            .insert_task(EntityType::Article, 1, Language::De, Language::En, TaskStatus::InProgress)
            .expect("insert");

        let closed = tracker
            .close_all(EntityType::Article, 1, Language::En)
            .expect("close");
        assert_eq!(closed, 2);

        let stats = tracker.stats().expect("stats");
        assert_eq!(stats.done, 2);
        assert_eq!(stats.pending, 0);
    }
}
