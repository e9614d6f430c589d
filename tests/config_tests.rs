//! Tests for the type-safe configuration builder

use chrono::NaiveDate;
use idx_scrape::config::{HarvestConfig, default_date_window, normalize_proxy};
use idx_scrape::error::HarvestError;
use idx_scrape::fetch::Tier;
use idx_scrape::utils::DEFAULT_KEYWORDS;
use std::time::Duration;

mod common;
use common::date;

fn window() -> (NaiveDate, NaiveDate) {
    (date(2024, 1, 1), date(2024, 1, 3))
}

#[test]
fn test_builder_requires_date_window() {
    // This should not compile if uncommented - build() needs a date window
    // let config = HarvestConfig::builder().build();

    let (from, to) = window();
    let config = HarvestConfig::builder().date_window(from, to).build().unwrap();
    assert_eq!(config.date_from(), from);
    assert_eq!(config.date_to(), to);
}

#[test]
fn test_builder_optional_fields_have_defaults() {
    let (from, to) = window();
    let config = HarvestConfig::builder().date_window(from, to).build().unwrap();

    assert_eq!(config.keywords().len(), DEFAULT_KEYWORDS.len());
    assert_eq!(config.keywords()[0], "Prospektus");
    assert_eq!(config.emiten_type(), "*");
    assert_eq!(config.lang(), "id");
    assert_eq!(config.page_size(), 100);
    assert_eq!(config.max_pages(), 10);
    assert_eq!(config.retry_ceiling(), 3);
    assert_eq!(config.retry_delay(), Duration::from_secs(2));
    assert_eq!(config.poll_attempts(), 30);
    assert_eq!(config.poll_interval(), Duration::from_secs(2));
    assert!(!config.allow_interactive());
    assert!(config.client_filter());
    assert!(config.remember_proven_strategy());
    assert!(config.proxy_url().is_none());
    assert!(config.cookie_export_path().is_some());
    assert!(
        config
            .storage_state_path()
            .ends_with("idx-scraper/playwright_storage_state.json")
    );
}

#[test]
fn test_builder_with_all_optional_fields() {
    let (from, to) = window();
    let config = HarvestConfig::builder()
        .keywords([" HMETD ", "", "MTO"])
        .api_url("http://127.0.0.1:9999/api")
        .home_url("http://127.0.0.1:9999/")
        .page_size(25)
        .max_pages(2)
        .storage_state_path("/tmp/idx/state.json")
        .cookie_export_path(None)
        .cookie_header(Some("a=1".to_string()))
        .auth_token(Some("  ".to_string()))
        .proxy_url(Some("proxy.local:3128".to_string()))
        .allow_interactive(true)
        .client_filter(false)
        .remember_proven_strategy(false)
        .retry_ceiling(0)
        .poll_attempts(0)
        .date_window(from, to)
        .build()
        .unwrap();

    assert_eq!(config.keywords(), ["HMETD", "MTO"]);
    assert_eq!(config.page_size(), 25);
    assert_eq!(config.max_pages(), 2);
    assert_eq!(config.cookie_header(), Some("a=1"));
    assert_eq!(config.auth_token(), None);
    assert_eq!(config.proxy_url(), Some("http://proxy.local:3128"));
    assert!(config.allow_interactive());
    assert!(!config.client_filter());
    assert!(!config.remember_proven_strategy());
    assert_eq!(config.retry_ceiling(), 1);
    assert_eq!(config.poll_attempts(), 1);

    let target = config.api_target().unwrap();
    assert_eq!(target.origin(), "http://127.0.0.1:9999");
    assert_eq!(config.http_settings().proxy.as_deref(), Some("http://proxy.local:3128"));
}

#[test]
fn test_reversed_window_is_rejected() {
    let result = HarvestConfig::builder()
        .date_window(date(2024, 2, 1), date(2024, 1, 1))
        .build();
    assert!(matches!(result, Err(HarvestError::Config(_))));
}

#[test]
fn test_zero_page_size_and_blank_keywords_are_rejected() {
    let (from, to) = window();
    assert!(
        HarvestConfig::builder()
            .page_size(0)
            .date_window(from, to)
            .build()
            .is_err()
    );
    assert!(
        HarvestConfig::builder()
            .keywords(["  "])
            .date_window(from, to)
            .build()
            .is_err()
    );
    assert!(
        HarvestConfig::builder()
            .api_url("not a url")
            .date_window(from, to)
            .build()
            .is_err()
    );
}

#[test]
fn test_default_window_is_two_days_back() {
    let (from, to) = default_date_window(date(2024, 3, 1));
    assert_eq!(from, date(2024, 2, 28));
    assert_eq!(to, date(2024, 3, 1));
}

#[test]
fn test_proxy_normalization() {
    assert_eq!(normalize_proxy("10.0.0.1:8080").as_deref(), Some("http://10.0.0.1:8080"));
    assert_eq!(normalize_proxy("socks5://h:1").as_deref(), Some("socks5://h:1"));
    assert_eq!(normalize_proxy("   "), None);
}

#[test]
fn test_tiers_order_cheapest_first() {
    let mut tiers = Tier::ALL.to_vec();
    tiers.reverse();
    tiers.sort();
    assert_eq!(tiers, Tier::ALL.to_vec());
    assert!(Tier::BrowserHeadless.is_browser());
    assert!(!Tier::SessionReuse.is_browser());
}
