//! Page requests and the API location they are sent to

use chrono::NaiveDate;
use url::Url;

use crate::error::{HarvestError, HarvestResult};

/// Calendar format used by the `dateFrom`/`dateTo` query parameters
pub const QUERY_DATE_FORMAT: &str = "%Y%m%d";

/// One page attempt for one keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    keyword: String,
    date_from: NaiveDate,
    date_to: NaiveDate,
    page_offset: u32,
    page_size: u32,
}

impl FetchRequest {
    /// First page of `keyword` over the inclusive window
    pub fn first_page(
        keyword: impl Into<String>,
        date_from: NaiveDate,
        date_to: NaiveDate,
        page_size: u32,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            date_from,
            date_to,
            page_offset: 0,
            page_size,
        }
    }

    /// Same query, `page_size` rows further on
    #[must_use]
    pub fn next_page(&self) -> Self {
        Self {
            page_offset: self.page_offset.saturating_add(self.page_size),
            ..self.clone()
        }
    }

    /// Cheap one-row request used to test whether a session yields JSON
    #[must_use]
    pub fn probe(&self) -> Self {
        Self {
            page_offset: 0,
            page_size: 1,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[must_use]
    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    #[must_use]
    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    #[must_use]
    pub fn page_offset(&self) -> u32 {
        self.page_offset
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Where and how announcement queries are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTarget {
    api_url: Url,
    home_url: Url,
    emiten_type: String,
    lang: String,
}

impl ApiTarget {
    pub fn new(
        api_url: &str,
        home_url: &str,
        emiten_type: impl Into<String>,
        lang: impl Into<String>,
    ) -> HarvestResult<Self> {
        let parse = |s: &str| {
            Url::parse(s).map_err(|e| HarvestError::Config(format!("Invalid URL '{s}': {e}")))
        };
        Ok(Self {
            api_url: parse(api_url)?,
            home_url: parse(home_url)?,
            emiten_type: emiten_type.into(),
            lang: lang.into(),
        })
    }

    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    #[must_use]
    pub fn home_url(&self) -> &Url {
        &self.home_url
    }

    /// `scheme://host[:port]` of the home page, used as the `Origin` header
    #[must_use]
    pub fn origin(&self) -> String {
        self.home_url.origin().ascii_serialization()
    }

    /// Full API URL for `request`
    #[must_use]
    pub fn url_for(&self, request: &FetchRequest) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("emitenType", &self.emiten_type)
            .append_pair(
                "dateFrom",
                &request.date_from.format(QUERY_DATE_FORMAT).to_string(),
            )
            .append_pair(
                "dateTo",
                &request.date_to.format(QUERY_DATE_FORMAT).to_string(),
            )
            .append_pair("lang", &self.lang)
            .append_pair("keyword", &request.keyword)
            .append_pair("indexFrom", &request.page_offset.to_string())
            .append_pair("pageSize", &request.page_size.to_string());
        url
    }
}
