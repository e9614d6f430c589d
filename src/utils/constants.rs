//! Shared configuration constants for idx_scrape
//!
//! Default values, endpoint locations and header profiles used throughout
//! the codebase so that no magic strings are scattered across strategies.

/// Home page visited before API calls so the site can set its cookies
pub const IDX_HOME_URL: &str = "https://www.idx.co.id/";

/// Announcement search endpoint
pub const IDX_API_URL: &str = "https://www.idx.co.id/primary/ListedCompany/GetAnnouncement";

/// Origin header value sent with API calls
pub const IDX_ORIGIN: &str = "https://www.idx.co.id";

/// Cookie domain used when importing a raw `Cookie:` header
pub const IDX_COOKIE_DOMAIN: &str = ".idx.co.id";

/// Name of the cookie or localStorage entry that marks an authenticated session
pub const AUTH_MARKER: &str = "auth._token.local";

/// Primary desktop user agent, shared by plain HTTP and the automation browser
pub const PRIMARY_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Alternate user agent tried once after the primary one is blocked
pub const ALT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// `Accept` header for API calls
pub const API_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// `Accept-Language` header for API calls
pub const API_ACCEPT_LANGUAGE: &str = "id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7";

/// Default issuer type filter (`*` = all)
pub const DEFAULT_EMITEN_TYPE: &str = "*";

/// Default response language
pub const DEFAULT_LANG: &str = "id";

/// Default number of replies requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default ceiling on pages fetched per keyword
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Default look-back window when no `dateFrom` is given
pub const DEFAULT_LOOKBACK_DAYS: i64 = 2;

/// Attempts per strategy on transport failure
pub const DEFAULT_RETRY_CEILING: u32 = 3;

/// Fixed pause between transport retries
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

/// Probe polls after the user confirms a challenge was solved
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// Fixed pause between probe polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Timeout for a single HTTP request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for the warm-up GET of the home page
pub const WARMUP_TIMEOUT_SECS: u64 = 10;

/// Timeout for browser navigation to the home page
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;

/// Upper bound on waiting for the home page network to go idle
pub const NETWORK_SETTLE_TIMEOUT_SECS: u64 = 10;

/// Maximum characters of a non-JSON body kept for diagnostics
pub const EXCERPT_CHARS: usize = 400;

/// Directory name under the user config dir holding session files
pub const CONFIG_DIR_NAME: &str = "idx-scraper";

/// File name of the persisted session storage state
pub const STORAGE_STATE_FILE: &str = "playwright_storage_state.json";

/// File name of the reduced cookie export
pub const COOKIE_EXPORT_FILE: &str = "session_cookies.json";

/// CSV header columns, in output order
pub const CSV_HEADER: [&str; 3] = ["Kode_Emiten", "Judul_Pengumuman", "Tanggal_Pengumuman"];

/// CSV field delimiter
pub const CSV_DELIMITER: u8 = b';';

/// Keywords queried when the caller supplies none
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Prospektus",
    "Pengambilalihan",
    "Negosiasi Pengambilalihan",
    "Penawaran Tender Wajib",
    "Penawaran Tender",
    "Mandatory Tender Offer",
    "MTO",
    "Transaksi Material",
    "Transaksi Afiliasi",
    "Perubahan Kegiatan Usaha",
    "Perjanjian Pengikatan Jual Beli",
    "Perjanjian Jual Beli",
    "PPJB",
    "Hak Memesan Efek",
    "HMETD",
    "CSPA",
    "Kontrak Penting",
];
