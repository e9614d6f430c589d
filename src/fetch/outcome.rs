//! Result of one page attempt, and how raw responses are classified

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::records::{ApiResponse, RawReply};
use crate::utils::string_utils::{excerpt, looks_like_json};

/// What one strategy observed for one page
///
/// Blocking and challenge pages are data here, not errors: they drive
/// escalation.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success {
        replies: Vec<RawReply>,
        total_count: Option<u64>,
    },
    /// HTTP 403 or another refusal status
    Blocked { reason: String },
    /// A body that is not the expected JSON, usually a challenge page
    NonJson { excerpt: String },
    /// Connection failure or timeout
    TransportError { cause: String },
}

impl FetchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Blocked or challenged: the next tier may do better
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            FetchOutcome::Blocked { .. } | FetchOutcome::NonJson { .. }
        )
    }

    /// Short variant name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Success { .. } => "success",
            FetchOutcome::Blocked { .. } => "blocked",
            FetchOutcome::NonJson { .. } => "non_json",
            FetchOutcome::TransportError { .. } => "transport_error",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Success {
                replies,
                total_count,
            } => match total_count {
                Some(total) => write!(f, "{} replies (total {})", replies.len(), total),
                None => write!(f, "{} replies", replies.len()),
            },
            FetchOutcome::Blocked { reason } => write!(f, "blocked: {reason}"),
            FetchOutcome::NonJson { excerpt } => write!(f, "non-JSON body: {excerpt}"),
            FetchOutcome::TransportError { cause } => write!(f, "transport error: {cause}"),
        }
    }
}

/// Classify a completed HTTP exchange
///
/// 403 and other non-2xx statuses are `Blocked`. A 2xx body that is not a
/// JSON object is `NonJson`. Malformed entries inside a JSON object are
/// dropped by the reply model and do not change the classification.
#[must_use]
pub fn classify_response(status: u16, body: &str) -> FetchOutcome {
    if status == 403 {
        return FetchOutcome::Blocked {
            reason: "HTTP 403 Forbidden".to_string(),
        };
    }
    if !(200..300).contains(&status) {
        return FetchOutcome::Blocked {
            reason: format!("HTTP {status}: {}", excerpt(body)),
        };
    }
    if !looks_like_json(body) {
        return FetchOutcome::NonJson {
            excerpt: excerpt(body),
        };
    }
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            return FetchOutcome::NonJson {
                excerpt: excerpt(body),
            };
        }
    };
    match ApiResponse::deserialize(value) {
        Ok(parsed) => FetchOutcome::Success {
            replies: parsed.replies,
            total_count: parsed.result_count,
        },
        Err(_) => FetchOutcome::NonJson {
            excerpt: excerpt(body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_blocked() {
        assert!(matches!(
            classify_response(403, "{}"),
            FetchOutcome::Blocked { .. }
        ));
        assert!(classify_response(503, "oops").is_refusal());
    }

    #[test]
    fn html_challenge_is_non_json() {
        let outcome = classify_response(200, "<!DOCTYPE html><title>Just a moment...</title>");
        match outcome {
            FetchOutcome::NonJson { excerpt } => assert!(excerpt.starts_with("<!DOCTYPE html>")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn json_array_is_not_an_api_body() {
        assert!(matches!(
            classify_response(200, "[1, 2]"),
            FetchOutcome::NonJson { .. }
        ));
    }

    #[test]
    fn one_bad_reply_does_not_spoil_the_page() {
        let body = r#"{"ResultCount": 2, "Replies": [
            {"pengumuman": "garbled", "attachments": [null]},
            {"pengumuman": {"Kode_Emiten": "ABC", "JudulPengumuman": "HMETD"}, "attachments": [null]}
        ]}"#;
        match classify_response(200, body) {
            FetchOutcome::Success {
                replies,
                total_count,
            } => {
                assert_eq!(replies.len(), 1);
                assert_eq!(replies[0].code(), "ABC");
                assert_eq!(total_count, Some(2));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn json_body_is_success() {
        let body = r#"{"ResultCount": 1, "Replies": [{"pengumuman": {"Kode_Emiten": "ABC"}}]}"#;
        match classify_response(200, body) {
            FetchOutcome::Success {
                replies,
                total_count,
            } => {
                assert_eq!(replies.len(), 1);
                assert_eq!(total_count, Some(1));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
