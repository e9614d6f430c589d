//! Offset walking and stop conditions

use async_trait::async_trait;
use idx_scrape::HarvestConfig;
use idx_scrape::error::{HarvestError, HarvestResult};
use idx_scrape::fetch::{FetchRequest, Tier};
use idx_scrape::harvest::run_with_source;
use idx_scrape::paginator::{PageFetch, PageSource, Paginator, StopReason};

mod common;
use common::*;

/// Serves `total` numbered replies per keyword, honoring offset and size
struct CatalogSource {
    total: u64,
    report_total: bool,
    fail_at_offset: Option<u32>,
    auth_required_on: Option<&'static str>,
    offsets: Vec<(String, u32)>,
}

impl CatalogSource {
    fn new(total: u64) -> Self {
        Self {
            total,
            report_total: true,
            fail_at_offset: None,
            auth_required_on: None,
            offsets: Vec::new(),
        }
    }
}

#[async_trait]
impl PageSource for CatalogSource {
    async fn fetch_page(&mut self, request: &FetchRequest) -> HarvestResult<PageFetch> {
        self.offsets
            .push((request.keyword().to_string(), request.page_offset()));
        if self.auth_required_on == Some(request.keyword()) {
            return Err(HarvestError::AuthRequired("probe failed".to_string()));
        }
        if self.fail_at_offset == Some(request.page_offset()) {
            return Ok(PageFetch::Failed {
                reason: "connection reset".to_string(),
            });
        }
        let start = u64::from(request.page_offset());
        let end = (start + u64::from(request.page_size())).min(self.total);
        let replies = (start..end)
            .map(|i| {
                reply(
                    &format!("C{i:03}"),
                    &format!("{} {i}", request.keyword()),
                    &format!("2024-01-{:02}T08:00:00", 1 + i % 28),
                )
            })
            .collect();
        Ok(PageFetch::Fetched {
            replies,
            total_count: self.report_total.then_some(self.total),
            tier: Tier::Direct,
        })
    }
}

fn offsets(source: &CatalogSource) -> Vec<u32> {
    source.offsets.iter().map(|(_, o)| *o).collect()
}

#[tokio::test]
async fn twenty_five_results_take_three_pages() {
    let mut source = CatalogSource::new(25);
    let harvest = Paginator::new(10, 10)
        .collect(&mut source, "HMETD", date(2024, 1, 1), date(2024, 1, 3))
        .await
        .unwrap();

    assert_eq!(offsets(&source), vec![0, 10, 20]);
    assert_eq!(harvest.pages, 3);
    assert_eq!(harvest.replies.len(), 25);
    assert_eq!(harvest.total_count, Some(25));
    assert_eq!(harvest.stop_reason, StopReason::Exhausted);
    assert_eq!(harvest.last_tier, Some(Tier::Direct));
}

#[tokio::test]
async fn exact_multiple_does_not_request_an_empty_page() {
    let mut source = CatalogSource::new(20);
    Paginator::new(10, 10)
        .collect(&mut source, "MTO", date(2024, 1, 1), date(2024, 1, 3))
        .await
        .unwrap();
    assert_eq!(offsets(&source), vec![0, 10]);
}

#[tokio::test]
async fn page_ceiling_bounds_the_walk() {
    let mut source = CatalogSource::new(1_000);
    let harvest = Paginator::new(10, 3)
        .collect(&mut source, "PPJB", date(2024, 1, 1), date(2024, 1, 3))
        .await
        .unwrap();
    assert_eq!(offsets(&source), vec![0, 10, 20]);
    assert_eq!(harvest.stop_reason, StopReason::PageLimit);
}

#[tokio::test]
async fn missing_total_stops_after_first_page() {
    let mut source = CatalogSource::new(50);
    source.report_total = false;
    let harvest = Paginator::new(10, 10)
        .collect(&mut source, "CSPA", date(2024, 1, 1), date(2024, 1, 3))
        .await
        .unwrap();
    assert_eq!(harvest.pages, 1);
    assert_eq!(harvest.stop_reason, StopReason::NoTotal);
}

#[tokio::test]
async fn failed_page_keeps_what_was_collected() {
    let mut source = CatalogSource::new(30);
    source.fail_at_offset = Some(10);
    let harvest = Paginator::new(10, 10)
        .collect(&mut source, "Prospektus", date(2024, 1, 1), date(2024, 1, 3))
        .await
        .unwrap();
    assert_eq!(harvest.replies.len(), 10);
    assert_eq!(harvest.pages, 1);
    assert_eq!(
        harvest.stop_reason,
        StopReason::Failed("connection reset".to_string())
    );
}

#[tokio::test]
async fn run_merges_keywords_and_reports_each() {
    let mut source = CatalogSource::new(12);
    let config = HarvestConfig::builder()
        .keywords(["Tender", "HMETD"])
        .page_size(5)
        .client_filter(false)
        .cookie_export_path(None)
        .date_window(date(2024, 1, 1), date(2024, 1, 31))
        .build()
        .unwrap();

    let report = run_with_source(&mut source, &config).await.unwrap();

    assert_eq!(report.keywords.len(), 2);
    assert_eq!(report.keywords[0].keyword, "Tender");
    assert_eq!(report.keywords[0].pages, 3);
    assert_eq!(report.keywords[1].replies, 12);
    // titles embed the keyword, so nothing collapses across keywords
    assert_eq!(report.records.len(), 24);
    assert_eq!(report.last_tier, Some(Tier::Direct));
    assert!(
        report
            .records
            .windows(2)
            .all(|w| w[0].parsed_date() >= w[1].parsed_date())
    );
}

#[tokio::test]
async fn client_filter_drops_replies_not_matching_any_keyword() {
    let mut source = CatalogSource::new(3);
    let config = HarvestConfig::builder()
        .keywords(["Tender"])
        .cookie_export_path(None)
        .date_window(date(2024, 1, 1), date(2024, 1, 31))
        .build()
        .unwrap();

    let report = run_with_source(&mut source, &config).await.unwrap();
    assert_eq!(report.records.len(), 3);
    assert!(report.records.iter().all(|r| r.source_keyword() == "Tender"));
}

#[tokio::test]
async fn auth_required_aborts_the_run_with_no_records() {
    let mut source = CatalogSource::new(5);
    source.auth_required_on = Some("MTO");
    let config = HarvestConfig::builder()
        .keywords(["HMETD", "MTO", "PPJB"])
        .cookie_export_path(None)
        .date_window(date(2024, 1, 1), date(2024, 1, 31))
        .build()
        .unwrap();

    let err = run_with_source(&mut source, &config).await.unwrap_err();
    assert!(err.is_auth_required());
    assert!(!source.offsets.iter().any(|(k, _)| k == "PPJB"));
}
