use serde::Serialize;

use crate::fetch::Tier;
use crate::paginator::{KeywordHarvest, StopReason};
use crate::records::AnnouncementRecord;

/// What one keyword contributed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordSummary {
    pub keyword: String,
    pub pages: u32,
    pub replies: usize,
    pub total_count: Option<u64>,
    pub stop_reason: StopReason,
    pub last_tier: Option<Tier>,
}

impl From<&KeywordHarvest> for KeywordSummary {
    fn from(harvest: &KeywordHarvest) -> Self {
        Self {
            keyword: harvest.keyword.clone(),
            pages: harvest.pages,
            replies: harvest.replies.len(),
            total_count: harvest.total_count,
            stop_reason: harvest.stop_reason.clone(),
            last_tier: harvest.last_tier,
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    /// Deduplicated records, newest first
    pub records: Vec<AnnouncementRecord>,
    /// One entry per keyword, in query order
    pub keywords: Vec<KeywordSummary>,
    /// Tier that served the last successful page of the run
    pub last_tier: Option<Tier>,
}

impl HarvestReport {
    /// Keywords that stopped on a failed page
    pub fn failed_keywords(&self) -> impl Iterator<Item = &KeywordSummary> {
        self.keywords
            .iter()
            .filter(|k| matches!(k.stop_reason, StopReason::Failed(_)))
    }
}
