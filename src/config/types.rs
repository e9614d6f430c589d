//! Core configuration type for harvesting runs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a harvesting run needs to know
///
/// Built with [`HarvestConfig::builder`]; the date window is the only
/// required input, everything else falls back to `utils::constants`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub(crate) api_url: String,
    pub(crate) home_url: String,

    /// Keywords queried one after another, in this order
    pub(crate) keywords: Vec<String>,

    /// Inclusive calendar window sent as `dateFrom`/`dateTo`
    pub(crate) date_from: NaiveDate,
    pub(crate) date_to: NaiveDate,

    pub(crate) emiten_type: String,
    pub(crate) lang: String,
    pub(crate) page_size: u32,
    pub(crate) max_pages: u32,

    /// Storage-state file read at start and rewritten on every session change
    pub(crate) storage_state_path: PathBuf,
    /// Cookie-only projection written next to every storage-state save
    pub(crate) cookie_export_path: Option<PathBuf>,

    /// Raw `Cookie:` header merged into the loaded session
    pub(crate) cookie_header: Option<String>,
    /// Bearer token treated as the local auth token
    #[serde(skip_serializing)]
    pub(crate) auth_token: Option<String>,
    /// Proxy for HTTP tiers and browser launch, always with a scheme
    pub(crate) proxy_url: Option<String>,

    /// Permit the headed tier, which needs a human
    pub(crate) allow_interactive: bool,
    /// Re-check every reply with the keyword matcher when merging
    pub(crate) client_filter: bool,
    /// Start later pages at the last tier that succeeded
    pub(crate) remember_proven_strategy: bool,
    /// GET the home page before each HTTP attempt
    pub(crate) warm_up: bool,

    pub(crate) retry_ceiling: u32,
    pub(crate) retry_delay_secs: u64,

    /// Probe polls after the user confirms a challenge is cleared
    pub(crate) poll_attempts: u32,
    pub(crate) poll_interval_secs: u64,

    pub(crate) request_timeout_secs: u64,
    pub(crate) navigation_timeout_secs: u64,
}
