// src/utils/html.rs

/// Sanitises staff-authored text (titles, questions, options) before storage.
///
/// Whitelist-based via `ammonia`: harmless formatting tags survive, scripts,
/// iframes and event-handler attributes are stripped along with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
