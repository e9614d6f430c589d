//! End-to-end run: keywords through the fallback chain into one record set

pub mod engine;
pub mod login;
pub mod report;

pub use engine::{build_orchestrator, harvest, initial_session, run_with_source};
pub use login::{capture_interactive_session, login};
pub use report::{HarvestReport, KeywordSummary};
