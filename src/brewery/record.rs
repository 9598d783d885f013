//! Upstream and outbound brewery representations.

use serde::{Deserialize, Deserializer, Serialize};

/// A brewery as returned by the upstream provider.
///
/// String fields that are missing or `null` upstream deserialize to an empty
/// string. Coordinates stay optional: `None` means the provider sent nothing,
/// which is distinct from a present `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub brewery_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address_1: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub state_province: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub country: String,
    #[serde(default, deserialize_with = "coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "coordinate")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub website_url: String,
}

/// The payload of one `data:` frame on `/stream`.
///
/// Every string field is populated; absent upstream values are replaced by
/// sentinels during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(rename = "typeColor")]
    pub category_color: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub phone: String,
    pub website: String,
    #[serde(rename = "mapUrl")]
    pub map_url: String,
    #[serde(rename = "hasLocation")]
    pub has_location: bool,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The provider has served coordinates both as JSON numbers and as numeric
/// strings; accept either.
fn coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    match Option::<Coordinate>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Coordinate::Number(value)) => Ok(Some(value)),
        Some(Coordinate::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Coordinate::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{text}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_parses_provider_payload() {
        let json = r#"{
            "id": "5128df48-79fc-4f0f-8b52-d06be54d0cec",
            "name": "(405) Brewing Co",
            "brewery_type": "micro",
            "address_1": "1716 Topeka St",
            "address_2": null,
            "city": "Norman",
            "state_province": "Oklahoma",
            "postal_code": "73069-8224",
            "country": "United States",
            "longitude": -97.46818222,
            "latitude": 35.25738891,
            "phone": "4058160490",
            "website_url": "http://www.405brewing.com",
            "state": "Oklahoma",
            "street": "1716 Topeka St"
        }"#;

        let raw: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(raw.name, "(405) Brewing Co");
        assert_eq!(raw.brewery_type, "micro");
        assert_eq!(raw.state_province, "Oklahoma");
        assert_eq!(raw.latitude, Some(35.25738891));
        assert_eq!(raw.longitude, Some(-97.46818222));
        assert_eq!(raw.phone, "4058160490");
    }

    #[test]
    fn test_null_and_missing_strings_become_empty() {
        let json = r#"{"name": "Nowhere Ales", "phone": null, "latitude": null}"#;

        let raw: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(raw.phone, "");
        assert_eq!(raw.city, "");
        assert_eq!(raw.website_url, "");
        assert_eq!(raw.latitude, None);
        assert_eq!(raw.longitude, None);
    }

    #[test]
    fn test_coordinates_accept_numeric_strings() {
        let json = r#"{"name": "x", "latitude": "0", "longitude": " 12.5 "}"#;

        let raw: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(raw.latitude, Some(0.0));
        assert_eq!(raw.longitude, Some(12.5));
    }

    #[test]
    fn test_garbage_coordinate_is_a_decode_error() {
        let json = r#"{"name": "x", "latitude": "north-ish"}"#;

        assert!(serde_json::from_str::<RawRecord>(json).is_err());
    }

    #[test]
    fn test_stream_record_wire_field_names() {
        let record = StreamRecord {
            name: "Acme".into(),
            category: "Brewpub".into(),
            category_color: "bg-green-500".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "N/A".into(),
            country: "Unknown".into(),
            phone: "Not available".into(),
            website: String::new(),
            map_url: String::new(),
            has_location: false,
        };

        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(
            keys,
            vec![
                "address",
                "city",
                "country",
                "hasLocation",
                "mapUrl",
                "name",
                "phone",
                "state",
                "type",
                "typeColor",
                "website"
            ]
        );
        assert_eq!(value["hasLocation"], serde_json::json!(false));
    }
}
