//! Domain types: canonical entities, per-language translation overlays, and
//! translation tasks.
//!
//! Canonical entities hold the authoritative fields in the default language.
//! Overlays hold nullable per-field overrides for exactly one (entity,
//! language) pair; a missing field means "no translation stored", never
//! "translated to empty".

use crate::error::ParseError;
use crate::language::Language;
use serde::{Deserialize, Serialize};

/// The kinds of content that get translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Article,
    Category,
    Author,
    Tag,
}

impl EntityType {
    /// Storage key, matching the task table's `entity_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Article => "ARTICLE",
            EntityType::Category => "CATEGORY",
            EntityType::Author => "AUTHOR",
            EntityType::Tag => "TAG",
        }
    }

    /// Placeholder label for task listings when the entity no longer exists.
    pub fn unknown_label(&self) -> &'static str {
        match self {
            EntityType::Article => "Unknown Article",
            EntityType::Category => "Unknown Category",
            EntityType::Author => "Unknown Author",
            EntityType::Tag => "Unknown Tag",
        }
    }

    pub fn from_str(s: &str) -> Result<EntityType, ParseError> {
        match s {
            "ARTICLE" => Ok(EntityType::Article),
            "CATEGORY" => Ok(EntityType::Category),
            "AUTHOR" => Ok(EntityType::Author),
            "TAG" => Ok(EntityType::Tag),
            other => Err(ParseError::UnknownEntityType(other.to_string())),
        }
    }
}

// ==================== Canonical entities ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub reading_time_minutes: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

// ==================== Translation overlays ====================

/// Per-language field overrides for one article.
///
/// Overlays are merged field by field: a `None` leaves whatever was stored
/// previously untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleOverlay {
    pub article_id: i64,
    pub language: Language,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub reading_time_minutes: Option<i64>,
}

impl ArticleOverlay {
    pub fn new(article_id: i64, language: Language) -> Self {
        Self {
            article_id,
            language,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryOverlay {
    pub category_id: i64,
    pub language: Language,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl CategoryOverlay {
    pub fn new(category_id: i64, language: Language) -> Self {
        Self {
            category_id,
            language,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorOverlay {
    pub author_id: i64,
    pub language: Language,
    pub bio: Option<String>,
}

impl AuthorOverlay {
    pub fn new(author_id: i64, language: Language) -> Self {
        Self {
            author_id,
            language,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagOverlay {
    pub tag_id: i64,
    pub language: Language,
    pub name: Option<String>,
}

impl TagOverlay {
    pub fn new(tag_id: i64, language: Language) -> Self {
        Self {
            tag_id,
            language,
            ..Default::default()
        }
    }
}

// ==================== Translation tasks ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn from_str(s: &str) -> Result<TaskStatus, ParseError> {
        match s {
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(ParseError::UnknownStatus(other.to_string())),
        }
    }
}

/// One unit of outstanding or completed translation work for an
/// (entity, target language) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationTask {
    pub id: i64,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub source_lang: Language,
    pub target_lang: Language,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}
