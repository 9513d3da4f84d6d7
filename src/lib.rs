//! Multilingual content localization for a small publishing backend.
//!
//! Canonical content is authored in the default language (German) and
//! stored once; every other language lives in sparse per-entity overlays.
//! The [`orchestrator::Orchestrator`] fills those overlays in the
//! background via two machine-translation providers, the
//! [`resolver`] module computes effective localized views with canonical
//! fallback, and the [`tasks::TaskTracker`] keeps an auditable ledger of
//! outstanding translation work.

pub mod claude;
pub mod config;
pub mod deepl;
pub mod error;
pub mod language;
pub mod model;
pub mod orchestrator;
pub mod resolver;
pub mod store;
pub mod tasks;

pub use config::Config;
pub use language::Language;
pub use model::{EntityType, TaskStatus};
pub use orchestrator::Orchestrator;
pub use store::ContentStore;
pub use tasks::TaskTracker;
