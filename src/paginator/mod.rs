//! Walks one keyword's result pages
//!
//! Offsets advance by the page size from 0. A keyword stops at the
//! reported total, at the page ceiling, on a failed page (keeping what was
//! collected), or when the server reports no total.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::HarvestResult;
use crate::fetch::{FetchRequest, Tier};
use crate::records::RawReply;

/// One page as seen by the paginator
#[derive(Debug, Clone, PartialEq)]
pub enum PageFetch {
    Fetched {
        replies: Vec<RawReply>,
        total_count: Option<u64>,
        tier: Tier,
    },
    Failed { reason: String },
}

/// Anything that can produce one page for a request
#[async_trait]
pub trait PageSource: Send {
    async fn fetch_page(&mut self, request: &FetchRequest) -> HarvestResult<PageFetch>;
}

/// Why a keyword stopped paginating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum StopReason {
    /// Offset reached the reported total
    Exhausted,
    /// Page ceiling hit
    PageLimit,
    /// Server gave no total, so there is no safe next offset
    NoTotal,
    /// Server returned an empty page before the total was reached
    EmptyPage,
    /// A page could not be fetched
    Failed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => f.write_str("all results fetched"),
            StopReason::PageLimit => f.write_str("page limit reached"),
            StopReason::NoTotal => f.write_str("no result count reported"),
            StopReason::EmptyPage => f.write_str("empty page"),
            StopReason::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Everything collected for one keyword
#[derive(Debug, Clone)]
pub struct KeywordHarvest {
    pub keyword: String,
    pub replies: Vec<RawReply>,
    pub pages: u32,
    pub total_count: Option<u64>,
    pub stop_reason: StopReason,
    /// Tier that served the last successful page
    pub last_tier: Option<Tier>,
}

/// Page size and ceiling for every keyword of a run
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: u32,
    max_pages: u32,
}

impl Paginator {
    #[must_use]
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            max_pages: max_pages.max(1),
        }
    }

    /// Collect all pages of `keyword` over the inclusive date window
    ///
    /// `Err` only for run-ending failures from the source.
    pub async fn collect<S: PageSource + ?Sized>(
        &self,
        source: &mut S,
        keyword: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> HarvestResult<KeywordHarvest> {
        let mut request = FetchRequest::first_page(keyword, date_from, date_to, self.page_size);
        let mut harvest = KeywordHarvest {
            keyword: keyword.to_string(),
            replies: Vec::new(),
            pages: 0,
            total_count: None,
            stop_reason: StopReason::Exhausted,
            last_tier: None,
        };

        loop {
            let page = source.fetch_page(&request).await?;
            let (replies, total_count, tier) = match page {
                PageFetch::Fetched {
                    replies,
                    total_count,
                    tier,
                } => (replies, total_count, tier),
                PageFetch::Failed { reason } => {
                    warn!(
                        keyword,
                        offset = request.page_offset(),
                        "Page failed, keeping {} replies: {}",
                        harvest.replies.len(),
                        reason
                    );
                    harvest.stop_reason = StopReason::Failed(reason);
                    break;
                }
            };

            let received = replies.len();
            harvest.pages += 1;
            harvest.replies.extend(replies);
            harvest.total_count = total_count.or(harvest.total_count);
            harvest.last_tier = Some(tier);

            let next = request.next_page();
            let Some(total) = total_count else {
                harvest.stop_reason = StopReason::NoTotal;
                break;
            };
            if u64::from(next.page_offset()) >= total {
                harvest.stop_reason = StopReason::Exhausted;
                break;
            }
            if received == 0 {
                harvest.stop_reason = StopReason::EmptyPage;
                break;
            }
            if harvest.pages >= self.max_pages {
                harvest.stop_reason = StopReason::PageLimit;
                break;
            }
            request = next;
        }

        info!(
            keyword,
            pages = harvest.pages,
            replies = harvest.replies.len(),
            stop = %harvest.stop_reason,
            "Keyword finished"
        );
        Ok(harvest)
    }
}
