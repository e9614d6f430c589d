//! Page retrieval: requests, outcomes, and the strategy tiers

pub mod browser;
pub mod http;
pub mod outcome;
pub mod request;
pub mod strategy;

pub use browser::{BrowserStrategy, ChallengeGate, PageRenderer, PollPolicy, StdinGate};
pub use http::{HttpSettings, HttpStrategy};
pub use outcome::{FetchOutcome, classify_response};
pub use request::{ApiTarget, FetchRequest, QUERY_DATE_FORMAT};
pub use strategy::{FetchStrategy, Readiness, StrategyAttempt, Tier};
