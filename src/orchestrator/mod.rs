//! Fallback across retrieval tiers
//!
//! `Direct → AltUserAgent → SessionReuse → BrowserHeadless → BrowserHeaded`.
//! Escalation happens only on a refusal (403, challenge page, failed
//! probe). A successful tier's session is adopted and persisted at once.

pub mod core;
pub mod transition;

pub use core::{FallbackOrchestrator, OrchestratorOptions};
pub use transition::{Transition, after_refusal};
