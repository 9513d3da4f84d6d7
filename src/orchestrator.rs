//! Background translation pipeline: fans canonical content mutations out
//! into per-language translation passes with dual-provider fallback and
//! partial-field merge.
//!
//! Orchestration is strictly best-effort. Nothing here ever reports back to
//! the triggering write; progress is observable only through the task
//! ledger and the stored overlays. Target languages are processed
//! sequentially within one run to bound provider concurrency; separate runs
//! for the same entity are not mutually excluded, so two rapid edits can
//! race at the field level (last write wins).

use crate::claude::ClaudeClient;
use crate::deepl::DeepLClient;
use crate::language::Language;
use crate::model::{ArticleOverlay, AuthorOverlay, CategoryOverlay, EntityType, TagOverlay};
use crate::store::ContentStore;
use crate::tasks::TaskTracker;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct Orchestrator {
    store: Arc<ContentStore>,
    deepl: DeepLClient,
    claude: ClaudeClient,
    tracker: TaskTracker,
    auto_translate: bool,
}

impl Orchestrator {
    /// Assembled once at startup; holds direct references to the store and
    /// both provider gateways.
    pub fn new(
        store: Arc<ContentStore>,
        deepl: DeepLClient,
        claude: ClaudeClient,
        auto_translate: bool,
    ) -> Self {
        let tracker = TaskTracker::new(store.clone());
        Self {
            store,
            deepl,
            claude,
            tracker,
            auto_translate,
        }
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Fire-and-forget dispatch: spawn the translation run and return
    /// immediately. No result channel, no cancellation; completion shows up
    /// in the task ledger.
    pub fn dispatch(self: &Arc<Self>, entity_type: EntityType, entity_id: i64, source: Language) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.translate_entity(entity_type, entity_id, source).await;
        });
    }

    /// Translate one entity into every non-source language. A no-op when
    /// auto-translation is disabled. Failures in one target language are
    /// contained there and never abort the remaining languages.
    pub async fn translate_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        source: Language,
    ) {
        if !self.auto_translate {
            return;
        }
        info!(
            "Auto-translating {} {} from {}",
            entity_type.as_str(),
            entity_id,
            source
        );

        for target in Language::targets(source) {
            let result = match entity_type {
                EntityType::Article => self.translate_article_to(entity_id, source, target).await,
                EntityType::Category => self.translate_category_to(entity_id, source, target).await,
                EntityType::Author => self.translate_author_to(entity_id, source, target).await,
                EntityType::Tag => self.translate_tag_to(entity_id, source, target).await,
            };
            if let Err(e) = result {
                error!(
                    "Failed to auto-translate {} {} to {}: {}",
                    entity_type.as_str(),
                    entity_id,
                    target,
                    e
                );
            }
        }
    }

    // ==================== Per-entity passes ====================

    async fn translate_article_to(
        &self,
        article_id: i64,
        source: Language,
        target: Language,
    ) -> Result<()> {
        // Fresh load: the entity may have changed since dispatch.
        let article = match self.store.get_article(article_id)? {
            Some(a) => a,
            None => return Ok(()),
        };

        // Effective source values: when the run originates in a non-default
        // language its overlay, if present, shadows the canonical fields.
        let source_overlay = if source.is_default() {
            None
        } else {
            self.store.get_article_overlay(article_id, source)?
        };
        let (title, excerpt, body, meta_title, meta_description) = match &source_overlay {
            Some(o) => (
                o.title.as_deref(),
                o.excerpt.as_deref(),
                o.body.as_deref(),
                o.meta_title.as_deref(),
                o.meta_description.as_deref(),
            ),
            None => (
                Some(article.title.as_str()),
                article.excerpt.as_deref(),
                Some(article.body.as_str()),
                article.meta_title.as_deref(),
                article.meta_description.as_deref(),
            ),
        };

        let translated_title = self.translate_short(title, source, target).await;
        let translated_excerpt = self.translate_short(excerpt, source, target).await;
        let translated_body = self.translate_long(body, source, target).await;
        let translated_meta_title = self.translate_short(meta_title, source, target).await;
        let translated_meta_desc = self.translate_short(meta_description, source, target).await;

        // Defining fields: without at least a title or a body there is
        // nothing worth persisting for this language.
        if translated_title.is_none() && translated_body.is_none() {
            warn!(
                "No translations produced for article {} -> {}",
                article_id, target
            );
            return Ok(());
        }

        let mut overlay = self
            .store
            .get_article_overlay(article_id, target)?
            .unwrap_or_else(|| ArticleOverlay::new(article_id, target));

        merge_field(&mut overlay.title, translated_title);
        merge_field(&mut overlay.excerpt, translated_excerpt);
        merge_field(&mut overlay.body, translated_body);
        merge_field(&mut overlay.meta_title, translated_meta_title);
        merge_field(&mut overlay.meta_description, translated_meta_desc);
        overlay.reading_time_minutes = article.reading_time_minutes;

        self.store.upsert_article_overlay(&overlay)?;
        self.tracker
            .close_all(EntityType::Article, article_id, target)?;
        info!("Auto-translated article {} to {}", article_id, target);
        Ok(())
    }

    async fn translate_category_to(
        &self,
        category_id: i64,
        source: Language,
        target: Language,
    ) -> Result<()> {
        let category = match self.store.get_category(category_id)? {
            Some(c) => c,
            None => return Ok(()),
        };

        let source_overlay = if source.is_default() {
            None
        } else {
            self.store.get_category_overlay(category_id, source)?
        };
        let (name, display_name, description) = match &source_overlay {
            Some(o) => (
                o.name.as_deref(),
                o.display_name.as_deref(),
                o.description.as_deref(),
            ),
            None => (
                Some(category.name.as_str()),
                category.display_name.as_deref(),
                category.description.as_deref(),
            ),
        };

        let translated_name = self.translate_short(name, source, target).await;
        let translated_display = self.translate_short(display_name, source, target).await;
        let translated_desc = self.translate_short(description, source, target).await;

        if translated_name.is_none() && translated_display.is_none() {
            warn!(
                "No translations produced for category {} -> {}",
                category_id, target
            );
            return Ok(());
        }

        let mut overlay = self
            .store
            .get_category_overlay(category_id, target)?
            .unwrap_or_else(|| CategoryOverlay::new(category_id, target));

        merge_field(&mut overlay.name, translated_name);
        merge_field(&mut overlay.display_name, translated_display);
        merge_field(&mut overlay.description, translated_desc);

        self.store.upsert_category_overlay(&overlay)?;
        self.tracker
            .close_all(EntityType::Category, category_id, target)?;
        info!("Auto-translated category {} to {}", category_id, target);
        Ok(())
    }

    async fn translate_author_to(
        &self,
        author_id: i64,
        source: Language,
        target: Language,
    ) -> Result<()> {
        let author = match self.store.get_author(author_id)? {
            Some(a) => a,
            None => return Ok(()),
        };

        let source_overlay = if source.is_default() {
            None
        } else {
            self.store.get_author_overlay(author_id, source)?
        };
        let bio = match &source_overlay {
            Some(o) => o.bio.as_deref(),
            None => author.bio.as_deref(),
        };

        let translated_bio = self.translate_long(bio, source, target).await;
        if translated_bio.is_none() {
            warn!(
                "No translations produced for author {} -> {}",
                author_id, target
            );
            return Ok(());
        }

        let mut overlay = self
            .store
            .get_author_overlay(author_id, target)?
            .unwrap_or_else(|| AuthorOverlay::new(author_id, target));

        merge_field(&mut overlay.bio, translated_bio);

        self.store.upsert_author_overlay(&overlay)?;
        self.tracker
            .close_all(EntityType::Author, author_id, target)?;
        info!("Auto-translated author {} to {}", author_id, target);
        Ok(())
    }

    async fn translate_tag_to(
        &self,
        tag_id: i64,
        source: Language,
        target: Language,
    ) -> Result<()> {
        let tag = match self.store.get_tag(tag_id)? {
            Some(t) => t,
            None => return Ok(()),
        };

        let source_overlay = if source.is_default() {
            None
        } else {
            self.store.get_tag_overlay(tag_id, source)?
        };
        let name = match &source_overlay {
            Some(o) => o.name.as_deref(),
            None => Some(tag.name.as_str()),
        };

        let translated_name = self.translate_short(name, source, target).await;
        if translated_name.is_none() {
            warn!("No translations produced for tag {} -> {}", tag_id, target);
            return Ok(());
        }

        let mut overlay = self
            .store
            .get_tag_overlay(tag_id, target)?
            .unwrap_or_else(|| TagOverlay::new(tag_id, target));

        merge_field(&mut overlay.name, translated_name);

        self.store.upsert_tag_overlay(&overlay)?;
        self.tracker.close_all(EntityType::Tag, tag_id, target)?;
        info!("Auto-translated tag {} to {}", tag_id, target);
        Ok(())
    }

    // ==================== Field strategy ====================

    /// Short fields (titles, names, meta text): DeepL first, Claude as
    /// fallback. Blank or absent source text is skipped outright.
    async fn translate_short(
        &self,
        text: Option<&str>,
        source: Language,
        target: Language,
    ) -> Option<String> {
        let text = text.filter(|t| !t.trim().is_empty())?;
        match self.deepl.translate(text, source, target).await {
            Some(result) => Some(result),
            None => self.claude.translate(text, source, target).await,
        }
    }

    /// Long/structured fields (bodies, biographies): Claude first for its
    /// markup handling, DeepL as fallback.
    async fn translate_long(
        &self,
        text: Option<&str>,
        source: Language,
        target: Language,
    ) -> Option<String> {
        let text = text.filter(|t| !t.trim().is_empty())?;
        match self.claude.translate(text, source, target).await {
            Some(result) => Some(result),
            None => self.deepl.translate(text, source, target).await,
        }
    }
}

/// Partial merge: only fields that produced a translation overwrite the
/// stored value; failed fields keep whatever was there before.
fn merge_field(slot: &mut Option<String>, translated: Option<String>) {
    if translated.is_some() {
        *slot = translated;
    }
}
