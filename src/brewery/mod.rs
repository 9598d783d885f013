//! Brewery records and the transform from upstream shape to wire shape.
//!
//! - `record` - `RawRecord` (upstream JSON) and `StreamRecord` (SSE payload)
//! - `normalize` - sentinel defaulting, phone formatting, category tables
//! - `map_link` - map-search URL built from address parts

pub mod map_link;
pub mod normalize;
pub mod record;

pub use map_link::{MAP_SEARCH_URL, build_map_url};
pub use normalize::{
    ADDRESS_UNAVAILABLE, DEFAULT_CATEGORY_COLOR, PHONE_UNAVAILABLE, UNKNOWN, UNKNOWN_REGION,
    category_color, category_label, format_phone, normalize,
};
pub use record::{RawRecord, StreamRecord};
