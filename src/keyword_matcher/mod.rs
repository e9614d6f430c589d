//! Client-side keyword matching
//!
//! The API already filters server-side on the `keyword` parameter; this
//! module is the independent check applied when merging. Matching is a
//! substring test over normalized text, so `dokumen_Penawaran_Tender.pdf`
//! matches the keyword `Penawaran Tender`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Any run of characters that are not letters or digits
static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid non-alphanumeric run regex"));

/// Normalize text for matching
///
/// Lowercases, straightens curly quotes, and collapses every run of
/// non-alphanumeric characters (underscores and filename punctuation
/// included) to a single space.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text
        .to_lowercase()
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    NON_ALNUM_RUN.replace_all(&lowered, " ").into_owned()
}

/// Pre-normalized keyword set
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher, normalizing each keyword once
    ///
    /// Keywords that normalize to nothing (blank, punctuation only) are
    /// dropped so they cannot match every record.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| normalize(k.as_ref()).trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Normalized keywords, in input order
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True iff any keyword is a substring of the normalized candidate fields
    pub fn matches<I, S>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.keywords.is_empty() {
            return false;
        }

        let haystack = fields
            .into_iter()
            .map(|f| normalize(f.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");

        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// One-shot form of [`KeywordMatcher::matches`]
pub fn matches<F, FS, K, KS>(fields: F, keywords: K) -> bool
where
    F: IntoIterator<Item = FS>,
    FS: AsRef<str>,
    K: IntoIterator<Item = KS>,
    KS: AsRef<str>,
{
    KeywordMatcher::new(keywords).matches(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_punctuation_and_underscores() {
        assert_eq!(normalize("dokumen_Penawaran_Tender.pdf"), "dokumen penawaran tender pdf");
        assert_eq!(normalize("PT  ABC -- Tbk."), "pt abc tbk ");
    }

    #[test]
    fn normalize_straightens_curly_quotes_before_collapsing() {
        assert_eq!(normalize("\u{201C}HMETD\u{201D}"), " hmetd ");
    }

    #[test]
    fn filename_matches_spaced_keyword() {
        assert!(matches(["Penawaran_Tender.pdf"], ["Penawaran Tender"]));
    }

    #[test]
    fn empty_keyword_list_never_matches() {
        let none: [&str; 0] = [];
        assert!(!matches(["anything at all"], none));
        assert!(!matches(["anything at all"], ["", "  ", "--"]));
    }

    #[test]
    fn negative_match() {
        let matcher = KeywordMatcher::new(["Pengambilalihan", "Transaksi Material"]);
        assert!(!matcher.matches(["Laporan keuangan tahunan"]));
        assert!(matcher.matches(["Pengambilalihan saham oleh investor"]));
    }
}
