//! Merge, deduplication and ordering of records across keywords

use idx_scrape::keyword_matcher::{KeywordMatcher, matches};
use idx_scrape::records::{AnnouncementRecord, RawReply, dedup_records, merge_batches};
use proptest::prelude::*;

mod common;
use common::*;

#[test]
fn same_announcement_from_two_keywords_is_one_record() {
    let a = vec![reply("ABC", "X", "2024-01-01")];
    let b = vec![reply("ABC", "X", "2024-01-01"), reply("DEF", "Y", "2024-01-02")];

    let records = merge_batches([("HMETD", a.as_slice()), ("MTO", b.as_slice())], None);

    assert_eq!(records.len(), 2);
    let abc = records.iter().find(|r| r.code() == "ABC").unwrap();
    assert_eq!(abc.source_keyword(), "HMETD");
}

#[test]
fn unparseable_dates_sort_last() {
    let replies = vec![
        reply("AAA", "undated", "sometime soon"),
        reply("BBB", "old", "2023-12-31T10:00:00"),
        reply("CCC", "new", "02/01/2024 09:15:00"),
    ];
    let records = merge_batches([("k", replies.as_slice())], None);

    let codes: Vec<_> = records.iter().map(|r| r.code()).collect();
    assert_eq!(codes, vec!["CCC", "BBB", "AAA"]);
    assert!(records[2].has_unparsed_date());
}

#[test]
fn equal_dates_keep_insertion_order() {
    let replies = vec![
        reply("B", "second", "2024-01-01"),
        reply("A", "first", "2024-01-01"),
    ];
    let records = merge_batches([("k", replies.as_slice())], None);
    assert_eq!(records[0].code(), "B");
    assert_eq!(records[1].code(), "A");
}

#[test]
fn records_without_code_and_title_are_discarded() {
    let replies = vec![reply("", "", "2024-01-01"), reply("", "Title only", "2024-01-01")];
    let records = merge_batches([("k", replies.as_slice())], None);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title(), "Title only");
}

#[test]
fn client_filter_matches_attachment_filenames() {
    let mut by_attachment: RawReply = reply("ABC", "Keterbukaan Informasi", "2024-01-01");
    by_attachment.attachments.push(idx_scrape::records::Attachment {
        original_filename: Some("Penawaran_Tender.pdf".to_string()),
        pdf_filename: None,
    });
    let unrelated = reply("DEF", "Laporan Bulanan", "2024-01-01");

    let replies = vec![by_attachment, unrelated];
    let records = merge_batches(
        [("Penawaran Tender", replies.as_slice())],
        Some(KeywordMatcher::new(["Penawaran Tender"])),
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code(), "ABC");
}

#[test]
fn matcher_ignores_case_and_punctuation() {
    assert!(matches(["Penawaran_Tender.pdf"], ["Penawaran Tender"]));
    assert!(matches(["RENCANA “HMETD” II"], ["hmetd"]));
    assert!(!matches(["Penawaran Tender"], Vec::<&str>::new()));
}

fn arb_record() -> impl Strategy<Value = AnnouncementRecord> {
    (
        "[A-C]{0,2}",
        "[xy ]{0,3}",
        prop_oneof![
            Just("2024-01-01".to_string()),
            Just("2024-01-02T08:00:00".to_string()),
            Just("31/12/2023 10:00:00".to_string()),
            Just("garbage".to_string()),
        ],
    )
        .prop_map(|(code, title, date)| AnnouncementRecord::new(code, title, date, "k"))
}

proptest! {
    #[test]
    fn dedup_is_idempotent(records in prop::collection::vec(arb_record(), 0..40)) {
        let once = dedup_records(records);
        let twice = dedup_records(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dedup_output_is_unique_and_sorted(records in prop::collection::vec(arb_record(), 0..40)) {
        let out = dedup_records(records);
        for (i, a) in out.iter().enumerate() {
            prop_assert!(a.is_identifiable());
            for b in &out[i + 1..] {
                prop_assert_ne!(a.dedup_key(), b.dedup_key());
                prop_assert!(a.parsed_date() >= b.parsed_date());
            }
        }
    }

    #[test]
    fn matcher_tolerates_separator_noise(sep in "[-_. ,/]{1,3}") {
        let field = format!("Transaksi{sep}Material");
        prop_assert!(matches([field.as_str()], ["transaksi material"]));
    }
}
