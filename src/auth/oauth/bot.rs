//! Bot detection for the interactive OAuth endpoints.
//!
//! Crawlers that follow the app install link would burn nonces and pollute
//! logs with failed callbacks, so the interactive handlers turn them away
//! before any state is created.

/// Substrings that mark a user agent as automated.
const BOT_MARKERS: &[&str] = &["bot", "crawler", "spider", "slurp", "headless", "scraper"];

/// Returns `true` if the user agent looks like an automated client.
///
/// A missing user agent is not treated as a bot; some legitimate clients
/// send none.
#[must_use]
pub fn is_bot_user_agent(user_agent: Option<&str>) -> bool {
    let Some(user_agent) = user_agent else {
        return false;
    };
    let lowered = user_agent.to_lowercase();
    BOT_MARKERS.iter().any(|marker| lowered.contains(marker))
}
