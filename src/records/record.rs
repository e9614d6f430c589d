use chrono::NaiveDateTime;
use serde::Serialize;

use super::date::{UNPARSED_DATE, parse_announcement_date};
use super::reply::RawReply;

/// One announcement, as emitted in the final output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementRecord {
    code: String,
    title: String,
    raw_date: String,
    #[serde(serialize_with = "serialize_parsed_date")]
    parsed_date: NaiveDateTime,
    source_keyword: String,
}

impl AnnouncementRecord {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        raw_date: impl Into<String>,
        source_keyword: impl Into<String>,
    ) -> Self {
        let raw_date = raw_date.into();
        let parsed_date = parse_announcement_date(&raw_date);
        Self {
            code: code.into(),
            title: title.into(),
            raw_date,
            parsed_date,
            source_keyword: source_keyword.into(),
        }
    }

    /// Build from a raw reply, trimming every field
    #[must_use]
    pub fn from_reply(reply: &RawReply, source_keyword: &str) -> Self {
        Self::new(reply.code(), reply.title(), reply.raw_date(), source_keyword)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn raw_date(&self) -> &str {
        &self.raw_date
    }

    #[must_use]
    pub fn parsed_date(&self) -> NaiveDateTime {
        self.parsed_date
    }

    /// True when the raw date matched no known format
    #[must_use]
    pub fn has_unparsed_date(&self) -> bool {
        self.parsed_date == UNPARSED_DATE
    }

    #[must_use]
    pub fn source_keyword(&self) -> &str {
        &self.source_keyword
    }

    /// A record with neither code nor title cannot be identified
    #[must_use]
    pub fn is_identifiable(&self) -> bool {
        !(self.code.is_empty() && self.title.is_empty())
    }

    /// Deduplication key
    #[must_use]
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.code, &self.title, &self.raw_date)
    }
}

fn serialize_parsed_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if *date == UNPARSED_DATE {
        serializer.serialize_none()
    } else {
        serializer.serialize_some(&date.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}
