//! Escalation rules, kept free of I/O

use crate::fetch::Tier;

/// What to do after a tier refused a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Try the next, more expensive tier
    Escalate(Tier),
    /// Give up on this page; the keyword keeps what it has
    PageFailed(String),
    /// No usable session and no permission to ask a human
    AuthRequired(String),
}

/// Next step after `tier` was blocked, challenged, or failed its probe
///
/// Only evidence of blocking escalates; transport failures never reach
/// this function.
#[must_use]
pub fn after_refusal(tier: Tier, has_auth_signal: bool, allow_interactive: bool) -> Transition {
    match tier {
        Tier::Direct => Transition::Escalate(Tier::AltUserAgent),
        Tier::AltUserAgent if has_auth_signal => Transition::Escalate(Tier::SessionReuse),
        Tier::AltUserAgent | Tier::SessionReuse => Transition::Escalate(Tier::BrowserHeadless),
        Tier::BrowserHeadless if allow_interactive => Transition::Escalate(Tier::BrowserHeaded),
        Tier::BrowserHeadless => Transition::AuthRequired(
            "headless browser could not obtain JSON and interactive escalation is disabled"
                .to_string(),
        ),
        Tier::BrowserHeaded => Transition::PageFailed(
            "challenge was not cleared within the polling budget".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_without_session() {
        assert_eq!(
            after_refusal(Tier::Direct, false, false),
            Transition::Escalate(Tier::AltUserAgent)
        );
        assert_eq!(
            after_refusal(Tier::AltUserAgent, false, false),
            Transition::Escalate(Tier::BrowserHeadless)
        );
        assert!(matches!(
            after_refusal(Tier::BrowserHeadless, false, false),
            Transition::AuthRequired(_)
        ));
    }

    #[test]
    fn session_reuse_only_with_auth_signal() {
        assert_eq!(
            after_refusal(Tier::AltUserAgent, true, false),
            Transition::Escalate(Tier::SessionReuse)
        );
        assert_eq!(
            after_refusal(Tier::SessionReuse, true, false),
            Transition::Escalate(Tier::BrowserHeadless)
        );
    }

    #[test]
    fn headed_only_when_permitted_and_terminal() {
        assert_eq!(
            after_refusal(Tier::BrowserHeadless, false, true),
            Transition::Escalate(Tier::BrowserHeaded)
        );
        assert!(matches!(
            after_refusal(Tier::BrowserHeaded, true, true),
            Transition::PageFailed(_)
        ));
    }
}
