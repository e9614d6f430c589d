//! Merge per-keyword replies into one deduplicated, date-sorted list

use std::collections::HashSet;

use tracing::debug;

use super::record::AnnouncementRecord;
use super::reply::RawReply;
use crate::keyword_matcher::KeywordMatcher;

/// Folds keyword batches into the final record list
///
/// Batches must be pushed in keyword order: among records with equal dates,
/// the first one seen keeps its position.
#[derive(Debug, Default)]
pub struct Deduplicator {
    filter: Option<KeywordMatcher>,
    seen: HashSet<(String, String, String)>,
    records: Vec<AnnouncementRecord>,
    filtered_out: usize,
    unidentifiable: usize,
}

impl Deduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only replies whose text fields match `matcher`
    #[must_use]
    pub fn with_filter(mut self, matcher: KeywordMatcher) -> Self {
        self.filter = Some(matcher);
        self
    }

    /// Add one keyword's replies
    pub fn push_batch(&mut self, keyword: &str, replies: &[RawReply]) {
        for reply in replies {
            let rejected = self
                .filter
                .as_ref()
                .is_some_and(|filter| !filter.matches(reply.text_fields()));
            if rejected {
                self.filtered_out += 1;
                continue;
            }
            self.push(AnnouncementRecord::from_reply(reply, keyword));
        }
    }

    /// Add one record, dropping it if unidentifiable or already seen
    pub fn push(&mut self, record: AnnouncementRecord) {
        if !record.is_identifiable() {
            self.unidentifiable += 1;
            return;
        }
        let (code, title, date) = record.dedup_key();
        let key = (code.to_string(), title.to_string(), date.to_string());
        if self.seen.insert(key) {
            self.records.push(record);
        }
    }

    /// Sorted records, newest first
    #[must_use]
    pub fn finish(self) -> Vec<AnnouncementRecord> {
        debug!(
            kept = self.records.len(),
            filtered_out = self.filtered_out,
            unidentifiable = self.unidentifiable,
            "Deduplication finished"
        );
        let mut records = self.records;
        sort_newest_first(&mut records);
        records
    }
}

/// Stable sort, descending by parsed date
pub fn sort_newest_first(records: &mut [AnnouncementRecord]) {
    records.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
}

/// Deduplicate and sort an existing record list
#[must_use]
pub fn dedup_records(records: Vec<AnnouncementRecord>) -> Vec<AnnouncementRecord> {
    let mut dedup = Deduplicator::new();
    for record in records {
        dedup.push(record);
    }
    dedup.finish()
}

/// Merge `(keyword, replies)` batches, optionally filtering with `matcher`
#[must_use]
pub fn merge_batches<'a, I>(batches: I, matcher: Option<KeywordMatcher>) -> Vec<AnnouncementRecord>
where
    I: IntoIterator<Item = (&'a str, &'a [RawReply])>,
{
    let mut dedup = match matcher {
        Some(m) => Deduplicator::new().with_filter(m),
        None => Deduplicator::new(),
    };
    for (keyword, replies) in batches {
        dedup.push_batch(keyword, replies);
    }
    dedup.finish()
}
