//! Raw upstream record to wire record.
//!
//! `normalize` is total and deterministic: every input produces a
//! `StreamRecord`, and the same input always produces the same output.

use super::map_link::build_map_url;
use super::record::{RawRecord, StreamRecord};

/// Sentinel for a missing street address.
pub const ADDRESS_UNAVAILABLE: &str = "Address not available";
/// Sentinel for a missing city or country.
pub const UNKNOWN: &str = "Unknown";
/// Sentinel for a missing state/province.
pub const UNKNOWN_REGION: &str = "N/A";
/// Sentinel for a missing phone number.
pub const PHONE_UNAVAILABLE: &str = "Not available";
/// Color tag for any category code not in the table.
pub const DEFAULT_CATEGORY_COLOR: &str = "bg-gray-500";

/// Known category codes: (code, label, color tag).
static CATEGORIES: [(&str, &str, &str); 10] = [
    ("micro", "Micro Brewery", "bg-amber-500"),
    ("nano", "Nano Brewery", "bg-yellow-500"),
    ("regional", "Regional Brewery", "bg-orange-500"),
    ("brewpub", "Brewpub", "bg-green-500"),
    ("large", "Large Brewery", "bg-blue-500"),
    ("planning", "Planning", "bg-purple-500"),
    ("bar", "Bar", "bg-pink-500"),
    ("contract", "Contract Brewing", "bg-indigo-500"),
    ("proprietor", "Proprietor", "bg-teal-500"),
    ("closed", "Closed", DEFAULT_CATEGORY_COLOR),
];

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    CATEGORIES.iter().find(|(known, _, _)| *known == code)
}

/// Human-readable label for a category code. Unknown codes are returned as-is.
pub fn category_label(code: &str) -> &str {
    lookup(code).map(|(_, label, _)| *label).unwrap_or(code)
}

/// Display color tag for a category code.
pub fn category_color(code: &str) -> &'static str {
    lookup(code)
        .map(|(_, _, color)| *color)
        .unwrap_or(DEFAULT_CATEGORY_COLOR)
}

/// Format a 10-character phone string as `(DDD) DDD-DDDD`.
///
/// Purely positional: the characters are not checked for digits. Length is
/// counted in chars, not bytes. Any other length is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() != 10 {
        return phone.to_string();
    }

    let area: String = chars[..3].iter().collect();
    let exchange: String = chars[3..6].iter().collect();
    let line: String = chars[6..].iter().collect();
    format!("({area}) {exchange}-{line}")
}

fn or_sentinel(value: &str, sentinel: &str) -> String {
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value.to_string()
    }
}

/// Map an upstream record into the shape streamed to clients.
pub fn normalize(raw: &RawRecord) -> StreamRecord {
    let city = or_sentinel(&raw.city, UNKNOWN);
    let state = or_sentinel(&raw.state_province, UNKNOWN_REGION);
    let country = or_sentinel(&raw.country, UNKNOWN);

    let phone = if raw.phone.is_empty() {
        PHONE_UNAVAILABLE.to_string()
    } else {
        format_phone(&raw.phone)
    };

    // Sentinels in city/state/country are filtered back out by the builder;
    // the street address is passed through raw.
    let map_url = build_map_url(&raw.name, &raw.address_1, &city, &state, &country);

    StreamRecord {
        name: raw.name.clone(),
        category: category_label(&raw.brewery_type).to_string(),
        category_color: category_color(&raw.brewery_type).to_string(),
        address: or_sentinel(&raw.address_1, ADDRESS_UNAVAILABLE),
        city,
        state,
        country,
        phone,
        website: raw.website_url.clone(),
        map_url,
        has_location: raw.latitude.is_some() && raw.longitude.is_some(),
    }
}
