//! IDX announcement harvester
//!
//! Queries the IDX announcement API keyword by keyword and escalates
//! through progressively heavier retrieval tiers when refused:
//! plain HTTP, an alternate user agent, the stored authenticated session,
//! then a headless and finally a headed Chromium. Results from every
//! keyword are merged, deduplicated and sorted newest first.

pub mod browser;
pub mod config;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod keyword_matcher;
pub mod orchestrator;
pub mod output;
pub mod paginator;
pub mod records;
pub mod session;
pub mod utils;

pub use config::{HarvestConfig, HarvestConfigBuilder};
pub use error::{EXIT_AUTH_REQUIRED, HarvestError, HarvestResult};
pub use fetch::{FetchOutcome, FetchRequest, FetchStrategy, Tier};
pub use harvest::{HarvestReport, KeywordSummary, harvest, login};
pub use keyword_matcher::KeywordMatcher;
pub use orchestrator::FallbackOrchestrator;
pub use output::{OutputFormat, save_csv, save_json};
pub use paginator::{PageFetch, PageSource, Paginator, StopReason};
pub use records::AnnouncementRecord;
pub use session::{SessionState, SessionStore};
