use crate::language::Language;
use crate::model::{
    Article, ArticleOverlay, Author, AuthorOverlay, Category, CategoryOverlay, EntityType, Tag,
    TagOverlay, TaskStatus, TranslationTask,
};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// SQLite-backed content store: canonical entities, per-language overlays,
/// and the translation-task ledger.
///
/// Overlay uniqueness per (entity, language) is enforced by UNIQUE
/// constraints; upserts go through `ON CONFLICT .. DO UPDATE` so a row is
/// replaced in place rather than duplicated.
#[derive(Clone)]
pub struct ContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl ContentStore {
    /// Open (or create) the store and ensure the schema exists.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                excerpt TEXT,
                body TEXT NOT NULL,
                meta_title TEXT,
                meta_description TEXT,
                reading_time_minutes INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                display_name TEXT,
                description TEXT,
                slug TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                bio TEXT,
                email TEXT,
                avatar_url TEXT
            );
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS article_overlays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_id INTEGER NOT NULL,
                language TEXT NOT NULL,
                title TEXT,
                excerpt TEXT,
                body TEXT,
                meta_title TEXT,
                meta_description TEXT,
                reading_time_minutes INTEGER,
                UNIQUE(article_id, language)
            );
            CREATE TABLE IF NOT EXISTS category_overlays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL,
                language TEXT NOT NULL,
                name TEXT,
                display_name TEXT,
                description TEXT,
                UNIQUE(category_id, language)
            );
            CREATE TABLE IF NOT EXISTS author_overlays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL,
                language TEXT NOT NULL,
                bio TEXT,
                UNIQUE(author_id, language)
            );
            CREATE TABLE IF NOT EXISTS tag_overlays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tag_id INTEGER NOT NULL,
                language TEXT NOT NULL,
                name TEXT,
                UNIQUE(tag_id, language)
            );
            CREATE TABLE IF NOT EXISTS translation_tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_type TEXT NOT NULL,
                entity_id INTEGER NOT NULL,
                source_lang TEXT NOT NULL,
                target_lang TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .context("Failed to create schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ==================== Articles ====================

    pub fn create_article(
        &self,
        title: &str,
        slug: &str,
        excerpt: Option<&str>,
        body: &str,
        meta_title: Option<&str>,
        meta_description: Option<&str>,
        reading_time_minutes: Option<i64>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO articles (title, slug, excerpt, body, meta_title, meta_description, reading_time_minutes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![title, slug, excerpt, body, meta_title, meta_description, reading_time_minutes, now],
        )
        .context("Failed to insert article")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let conn = self.conn.lock().unwrap();
        let article = conn
            .query_row(
                "SELECT id, title, slug, excerpt, body, meta_title, meta_description, reading_time_minutes, created_at, updated_at
                 FROM articles WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Article {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        slug: row.get(2)?,
                        excerpt: row.get(3)?,
                        body: row.get(4)?,
                        meta_title: row.get(5)?,
                        meta_description: row.get(6)?,
                        reading_time_minutes: row.get(7)?,
                        created_at: row.get(8)?,
                        updated_at: row.get(9)?,
                    })
                },
            )
            .optional()
            .context("Failed to load article")?;
        Ok(article)
    }

    pub fn update_article(
        &self,
        id: i64,
        title: &str,
        excerpt: Option<&str>,
        body: &str,
        meta_title: Option<&str>,
        meta_description: Option<&str>,
        reading_time_minutes: Option<i64>,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let rows = conn
            .execute(
                "UPDATE articles SET title = ?1, excerpt = ?2, body = ?3, meta_title = ?4,
                 meta_description = ?5, reading_time_minutes = ?6, updated_at = ?7 WHERE id = ?8",
                params![
                    title,
                    excerpt,
                    body,
                    meta_title,
                    meta_description,
                    reading_time_minutes,
                    now,
                    id
                ],
            )
            .context("Failed to update article")?;
        Ok(rows > 0)
    }

    pub fn get_article_overlay(
        &self,
        article_id: i64,
        language: Language,
    ) -> Result<Option<ArticleOverlay>> {
        let conn = self.conn.lock().unwrap();
        let overlay = conn
            .query_row(
                "SELECT article_id, language, title, excerpt, body, meta_title, meta_description, reading_time_minutes
                 FROM article_overlays WHERE article_id = ?1 AND language = ?2",
                params![article_id, language.code()],
                Self::map_article_overlay,
            )
            .optional()
            .context("Failed to load article overlay")?;
        Ok(overlay)
    }

    /// All known overlays for one article, keyed by language. Used by the
    /// resolver's fallback chain and by admin editing views.
    pub fn article_overlays(&self, article_id: i64) -> Result<HashMap<Language, ArticleOverlay>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT article_id, language, title, excerpt, body, meta_title, meta_description, reading_time_minutes
             FROM article_overlays WHERE article_id = ?1",
        )?;
        let overlays = stmt
            .query_map(params![article_id], Self::map_article_overlay)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list article overlays")?;
        Ok(overlays.into_iter().map(|o| (o.language, o)).collect())
    }

    pub fn upsert_article_overlay(&self, overlay: &ArticleOverlay) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO article_overlays (article_id, language, title, excerpt, body, meta_title, meta_description, reading_time_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(article_id, language) DO UPDATE SET
                title = excluded.title,
                excerpt = excluded.excerpt,
                body = excluded.body,
                meta_title = excluded.meta_title,
                meta_description = excluded.meta_description,
                reading_time_minutes = excluded.reading_time_minutes",
            params![
                overlay.article_id,
                overlay.language.code(),
                overlay.title,
                overlay.excerpt,
                overlay.body,
                overlay.meta_title,
                overlay.meta_description,
                overlay.reading_time_minutes,
            ],
        )
        .context("Failed to upsert article overlay")?;
        Ok(())
    }

    fn map_article_overlay(row: &Row<'_>) -> rusqlite::Result<ArticleOverlay> {
        Ok(ArticleOverlay {
            article_id: row.get(0)?,
            language: parse_language(row, 1)?,
            title: row.get(2)?,
            excerpt: row.get(3)?,
            body: row.get(4)?,
            meta_title: row.get(5)?,
            meta_description: row.get(6)?,
            reading_time_minutes: row.get(7)?,
        })
    }

    // ==================== Categories ====================

    pub fn create_category(
        &self,
        name: &str,
        display_name: Option<&str>,
        description: Option<&str>,
        slug: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO categories (name, display_name, description, slug) VALUES (?1, ?2, ?3, ?4)",
            params![name, display_name, description, slug],
        )
        .context("Failed to insert category")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        let category = conn
            .query_row(
                "SELECT id, name, display_name, description, slug FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        display_name: row.get(2)?,
                        description: row.get(3)?,
                        slug: row.get(4)?,
                    })
                },
            )
            .optional()
            .context("Failed to load category")?;
        Ok(category)
    }

    pub fn get_category_overlay(
        &self,
        category_id: i64,
        language: Language,
    ) -> Result<Option<CategoryOverlay>> {
        let conn = self.conn.lock().unwrap();
        let overlay = conn
            .query_row(
                "SELECT category_id, language, name, display_name, description
                 FROM category_overlays WHERE category_id = ?1 AND language = ?2",
                params![category_id, language.code()],
                Self::map_category_overlay,
            )
            .optional()
            .context("Failed to load category overlay")?;
        Ok(overlay)
    }

    pub fn category_overlays(
        &self,
        category_id: i64,
    ) -> Result<HashMap<Language, CategoryOverlay>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT category_id, language, name, display_name, description
             FROM category_overlays WHERE category_id = ?1",
        )?;
        let overlays = stmt
            .query_map(params![category_id], Self::map_category_overlay)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list category overlays")?;
        Ok(overlays.into_iter().map(|o| (o.language, o)).collect())
    }

    pub fn upsert_category_overlay(&self, overlay: &CategoryOverlay) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO category_overlays (category_id, language, name, display_name, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(category_id, language) DO UPDATE SET
                name = excluded.name,
                display_name = excluded.display_name,
                description = excluded.description",
            params![
                overlay.category_id,
                overlay.language.code(),
                overlay.name,
                overlay.display_name,
                overlay.description,
            ],
        )
        .context("Failed to upsert category overlay")?;
        Ok(())
    }

    fn map_category_overlay(row: &Row<'_>) -> rusqlite::Result<CategoryOverlay> {
        Ok(CategoryOverlay {
            category_id: row.get(0)?,
            language: parse_language(row, 1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            description: row.get(4)?,
        })
    }

    // ==================== Authors ====================

    pub fn create_author(
        &self,
        name: &str,
        slug: &str,
        bio: Option<&str>,
        email: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO authors (name, slug, bio, email, avatar_url) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, slug, bio, email, avatar_url],
        )
        .context("Failed to insert author")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_author(&self, id: i64) -> Result<Option<Author>> {
        let conn = self.conn.lock().unwrap();
        let author = conn
            .query_row(
                "SELECT id, name, slug, bio, email, avatar_url FROM authors WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Author {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                        bio: row.get(3)?,
                        email: row.get(4)?,
                        avatar_url: row.get(5)?,
                    })
                },
            )
            .optional()
            .context("Failed to load author")?;
        Ok(author)
    }

    pub fn get_author_overlay(
        &self,
        author_id: i64,
        language: Language,
    ) -> Result<Option<AuthorOverlay>> {
        let conn = self.conn.lock().unwrap();
        let overlay = conn
            .query_row(
                "SELECT author_id, language, bio FROM author_overlays
                 WHERE author_id = ?1 AND language = ?2",
                params![author_id, language.code()],
                Self::map_author_overlay,
            )
            .optional()
            .context("Failed to load author overlay")?;
        Ok(overlay)
    }

    pub fn author_overlays(&self, author_id: i64) -> Result<HashMap<Language, AuthorOverlay>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT author_id, language, bio FROM author_overlays WHERE author_id = ?1",
        )?;
        let overlays = stmt
            .query_map(params![author_id], Self::map_author_overlay)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list author overlays")?;
        Ok(overlays.into_iter().map(|o| (o.language, o)).collect())
    }

    pub fn upsert_author_overlay(&self, overlay: &AuthorOverlay) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO author_overlays (author_id, language, bio) VALUES (?1, ?2, ?3)
             ON CONFLICT(author_id, language) DO UPDATE SET bio = excluded.bio",
            params![overlay.author_id, overlay.language.code(), overlay.bio],
        )
        .context("Failed to upsert author overlay")?;
        Ok(())
    }

    fn map_author_overlay(row: &Row<'_>) -> rusqlite::Result<AuthorOverlay> {
        Ok(AuthorOverlay {
            author_id: row.get(0)?,
            language: parse_language(row, 1)?,
            bio: row.get(2)?,
        })
    }

    // ==================== Tags ====================

    pub fn create_tag(&self, name: &str, slug: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tags (name, slug) VALUES (?1, ?2)",
            params![name, slug],
        )
        .context("Failed to insert tag")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        let conn = self.conn.lock().unwrap();
        let tag = conn
            .query_row(
                "SELECT id, name, slug FROM tags WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("Failed to load tag")?;
        Ok(tag)
    }

    pub fn get_tag_overlay(&self, tag_id: i64, language: Language) -> Result<Option<TagOverlay>> {
        let conn = self.conn.lock().unwrap();
        let overlay = conn
            .query_row(
                "SELECT tag_id, language, name FROM tag_overlays
                 WHERE tag_id = ?1 AND language = ?2",
                params![tag_id, language.code()],
                Self::map_tag_overlay,
            )
            .optional()
            .context("Failed to load tag overlay")?;
        Ok(overlay)
    }

    pub fn tag_overlays(&self, tag_id: i64) -> Result<HashMap<Language, TagOverlay>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT tag_id, language, name FROM tag_overlays WHERE tag_id = ?1")?;
        let overlays = stmt
            .query_map(params![tag_id], Self::map_tag_overlay)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list tag overlays")?;
        Ok(overlays.into_iter().map(|o| (o.language, o)).collect())
    }

    pub fn upsert_tag_overlay(&self, overlay: &TagOverlay) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tag_overlays (tag_id, language, name) VALUES (?1, ?2, ?3)
             ON CONFLICT(tag_id, language) DO UPDATE SET name = excluded.name",
            params![overlay.tag_id, overlay.language.code(), overlay.name],
        )
        .context("Failed to upsert tag overlay")?;
        Ok(())
    }

    fn map_tag_overlay(row: &Row<'_>) -> rusqlite::Result<TagOverlay> {
        Ok(TagOverlay {
            tag_id: row.get(0)?,
            language: parse_language(row, 1)?,
            name: row.get(2)?,
        })
    }

    // ==================== Translation tasks ====================

    pub fn insert_task(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        source_lang: Language,
        target_lang: Language,
        status: TaskStatus,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO translation_tasks (entity_type, entity_id, source_lang, target_lang, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                entity_type.as_str(),
                entity_id,
                source_lang.code(),
                target_lang.code(),
                status.as_str(),
                now
            ],
        )
        .context("Failed to insert translation task")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_task(&self, id: i64) -> Result<Option<TranslationTask>> {
        let conn = self.conn.lock().unwrap();
        let task = conn
            .query_row(
                "SELECT id, entity_type, entity_id, source_lang, target_lang, status, created_at, updated_at
                 FROM translation_tasks WHERE id = ?1",
                params![id],
                Self::map_task,
            )
            .optional()
            .context("Failed to load translation task")?;
        Ok(task)
    }

    pub fn tasks_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Vec<TranslationTask>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity_type, entity_id, source_lang, target_lang, status, created_at, updated_at
             FROM translation_tasks WHERE entity_type = ?1 AND entity_id = ?2 ORDER BY id",
        )?;
        let tasks = stmt
            .query_map(params![entity_type.as_str(), entity_id], Self::map_task)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list tasks for entity")?;
        Ok(tasks)
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Result<Vec<TranslationTask>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity_type, entity_id, source_lang, target_lang, status, created_at, updated_at
             FROM translation_tasks WHERE status = ?1 ORDER BY id",
        )?;
        let tasks = stmt
            .query_map(params![status.as_str()], Self::map_task)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list tasks by status")?;
        Ok(tasks)
    }

    pub fn all_tasks(&self) -> Result<Vec<TranslationTask>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity_type, entity_id, source_lang, target_lang, status, created_at, updated_at
             FROM translation_tasks ORDER BY id",
        )?;
        let tasks = stmt
            .query_map([], Self::map_task)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list all tasks")?;
        Ok(tasks)
    }

    pub fn count_by_status(&self, status: TaskStatus) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM translation_tasks WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Set a task's status unconditionally, bumping `updated_at`.
    /// Returns false when no task with that id exists.
    pub fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let rows = conn
            .execute(
                "UPDATE translation_tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now, task_id],
            )
            .context("Failed to update task status")?;
        Ok(rows > 0)
    }

    /// Mark every non-DONE task matching (entity_type, entity_id,
    /// target_lang) as DONE. Duplicates, if any, are all closed in one
    /// statement. Returns the number of tasks closed.
    pub fn close_tasks(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        target_lang: Language,
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let rows = conn
            .execute(
                "UPDATE translation_tasks SET status = ?1, updated_at = ?2
                 WHERE entity_type = ?3 AND entity_id = ?4 AND target_lang = ?5 AND status != ?1",
                params![
                    TaskStatus::Done.as_str(),
                    now,
                    entity_type.as_str(),
                    entity_id,
                    target_lang.code()
                ],
            )
            .context("Failed to close translation tasks")?;
        Ok(rows)
    }

    fn map_task(row: &Row<'_>) -> rusqlite::Result<TranslationTask> {
        let entity_type: String = row.get(1)?;
        let status: String = row.get(5)?;
        Ok(TranslationTask {
            id: row.get(0)?,
            entity_type: EntityType::from_str(&entity_type).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            entity_id: row.get(2)?,
            source_lang: parse_language(row, 3)?,
            target_lang: parse_language(row, 4)?,
            status: TaskStatus::from_str(&status).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

fn parse_language(row: &Row<'_>, idx: usize) -> rusqlite::Result<Language> {
    let code: String = row.get(idx)?;
    Language::from_code(&code).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
