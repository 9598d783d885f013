//! Map-search link derived from a brewery's address parts.

use url::form_urlencoded;

use super::normalize::{UNKNOWN, UNKNOWN_REGION};

/// Search URL prefix; the joined address parts are appended as `query`.
pub const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Build a map-search URL from already-normalized address parts.
///
/// Parts are kept in the order name, address, city, state, country. Empty
/// parts are dropped, as are the `N/A` state and `Unknown` country sentinels.
/// Returns an empty string when nothing is left.
pub fn build_map_url(name: &str, address1: &str, city: &str, state: &str, country: &str) -> String {
    let parts: Vec<&str> = [
        Some(name),
        Some(address1),
        Some(city),
        (state != UNKNOWN_REGION).then_some(state),
        (country != UNKNOWN).then_some(country),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        return String::new();
    }

    // Form encoding: space becomes `+`, `*` stays literal and `~` becomes
    // `%7E`. Every variant decodes to the same query.
    let query: String = form_urlencoded::byte_serialize(parts.join(", ").as_bytes()).collect();
    format!("{MAP_SEARCH_URL}{query}")
}
