//! Reply payloads, output records, and the merge/dedup/sort stage

pub mod date;
pub mod dedup;
pub mod record;
pub mod reply;

pub use date::{UNPARSED_DATE, parse_announcement_date};
pub use dedup::{Deduplicator, dedup_records, merge_batches, sort_newest_first};
pub use record::AnnouncementRecord;
pub use reply::{Announcement, ApiResponse, Attachment, RawReply};
