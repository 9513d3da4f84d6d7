//! Language-fallback resolution: what text to show for an entity in a
//! requested language.
//!
//! Every field resolves independently through three tiers:
//! 1. the overlay for the requested language,
//! 2. the overlay for the default language (only when the requested language
//!    is not the default),
//! 3. the canonical entity's own field.
//!
//! Blank values (empty or whitespace-only) count as absent at tiers 1 and 2,
//! so a partially translated overlay never surfaces empty strings.

use crate::language::Language;
use crate::model::{
    Article, ArticleOverlay, Author, AuthorOverlay, Category, CategoryOverlay, Tag, TagOverlay,
};
use std::collections::HashMap;

/// The localized view of an article for one requested language, plus the
/// raw overlay dump for admin editing views.
#[derive(Debug, Clone)]
pub struct LocalizedArticle {
    pub id: i64,
    pub language: Language,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub reading_time_minutes: Option<i64>,
    pub overlays: HashMap<Language, ArticleOverlay>,
}

#[derive(Debug, Clone)]
pub struct LocalizedCategory {
    pub id: i64,
    pub language: Language,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct LocalizedAuthor {
    pub id: i64,
    pub language: Language,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocalizedTag {
    pub id: i64,
    pub language: Language,
    pub name: String,
    pub slug: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Three-tier per-field fallback over owned strings.
fn resolve_field(primary: Option<&str>, fallback: Option<&str>, canonical: &str) -> String {
    non_blank(primary)
        .or_else(|| non_blank(fallback))
        .unwrap_or(canonical)
        .to_string()
}

/// Same chain for fields the canonical entity itself may not have.
fn resolve_opt_field(
    primary: Option<&str>,
    fallback: Option<&str>,
    canonical: Option<&str>,
) -> Option<String> {
    non_blank(primary)
        .or_else(|| non_blank(fallback))
        .or(canonical)
        .map(str::to_string)
}

/// The default-language overlay is the tier-2 fallback slot, but only when
/// the requested language is not itself the default.
fn fallback_slot<T>(overlays: &HashMap<Language, T>, requested: Language) -> Option<&T> {
    if requested.is_default() {
        None
    } else {
        overlays.get(&Language::default_lang())
    }
}

pub fn resolve_article(
    article: &Article,
    overlays: &HashMap<Language, ArticleOverlay>,
    language: Language,
) -> LocalizedArticle {
    let primary = overlays.get(&language);
    let fallback = fallback_slot(overlays, language);

    let p = |f: fn(&ArticleOverlay) -> Option<&str>| primary.and_then(f);
    let fb = |f: fn(&ArticleOverlay) -> Option<&str>| fallback.and_then(f);

    let reading_time = primary
        .and_then(|o| o.reading_time_minutes)
        .or_else(|| fallback.and_then(|o| o.reading_time_minutes))
        .or(article.reading_time_minutes);

    LocalizedArticle {
        id: article.id,
        language,
        title: resolve_field(
            p(|o| o.title.as_deref()),
            fb(|o| o.title.as_deref()),
            &article.title,
        ),
        slug: article.slug.clone(),
        excerpt: resolve_opt_field(
            p(|o| o.excerpt.as_deref()),
            fb(|o| o.excerpt.as_deref()),
            article.excerpt.as_deref(),
        ),
        body: resolve_field(
            p(|o| o.body.as_deref()),
            fb(|o| o.body.as_deref()),
            &article.body,
        ),
        meta_title: resolve_opt_field(
            p(|o| o.meta_title.as_deref()),
            fb(|o| o.meta_title.as_deref()),
            article.meta_title.as_deref(),
        ),
        meta_description: resolve_opt_field(
            p(|o| o.meta_description.as_deref()),
            fb(|o| o.meta_description.as_deref()),
            article.meta_description.as_deref(),
        ),
        reading_time_minutes: reading_time,
        overlays: overlays.clone(),
    }
}

pub fn resolve_category(
    category: &Category,
    overlays: &HashMap<Language, CategoryOverlay>,
    language: Language,
) -> LocalizedCategory {
    let primary = overlays.get(&language);
    let fallback = fallback_slot(overlays, language);

    LocalizedCategory {
        id: category.id,
        language,
        name: resolve_field(
            primary.and_then(|o| o.name.as_deref()),
            fallback.and_then(|o| o.name.as_deref()),
            &category.name,
        ),
        display_name: resolve_opt_field(
            primary.and_then(|o| o.display_name.as_deref()),
            fallback.and_then(|o| o.display_name.as_deref()),
            category.display_name.as_deref(),
        ),
        description: resolve_opt_field(
            primary.and_then(|o| o.description.as_deref()),
            fallback.and_then(|o| o.description.as_deref()),
            category.description.as_deref(),
        ),
        slug: category.slug.clone(),
    }
}

pub fn resolve_author(
    author: &Author,
    overlays: &HashMap<Language, AuthorOverlay>,
    language: Language,
) -> LocalizedAuthor {
    let primary = overlays.get(&language);
    let fallback = fallback_slot(overlays, language);

    LocalizedAuthor {
        id: author.id,
        language,
        name: author.name.clone(),
        slug: author.slug.clone(),
        bio: resolve_opt_field(
            primary.and_then(|o| o.bio.as_deref()),
            fallback.and_then(|o| o.bio.as_deref()),
            author.bio.as_deref(),
        ),
        email: author.email.clone(),
        avatar_url: author.avatar_url.clone(),
    }
}

pub fn resolve_tag(
    tag: &Tag,
    overlays: &HashMap<Language, TagOverlay>,
    language: Language,
) -> LocalizedTag {
    let primary = overlays.get(&language);
    let fallback = fallback_slot(overlays, language);

    LocalizedTag {
        id: tag.id,
        language,
        name: resolve_field(
            primary.and_then(|o| o.name.as_deref()),
            fallback.and_then(|o| o.name.as_deref()),
            &tag.name,
        ),
        slug: tag.slug.clone(),
    }
}
