//! Catalog item and result records.
//!
//! Items carry `id` and `description` plus an open map of display fields
//! (name, image_url, ...) that the engine passes through untouched. The
//! engine never interprets display fields; they exist for whatever layer
//! renders the results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog item to be ranked.
///
/// `description` is the text that gets embedded. All other fields besides
/// `id` deserialize into `extra` and survive ranking unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier within one request
    pub id: u64,
    /// Text used for embedding; must be non-empty
    pub description: String,
    /// Caller-defined display fields, preserved opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A ranked item with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct Scored {
    #[serde(flatten)]
    pub item: Item,
    /// Cosine similarity to the query (-1.0 to 1.0)
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_fields_roundtrip() {
        let json = r#"{
            "id": 1,
            "name": "豪華和室套房",
            "description": "傳統榻榻米房間，配有私人溫泉。",
            "image_url": "https://example.com/room1.png"
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(item.description, "傳統榻榻米房間，配有私人溫泉。");
        assert_eq!(item.extra["name"], "豪華和室套房");
        assert_eq!(item.extra["image_url"], "https://example.com/room1.png");

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["name"], "豪華和室套房");
        assert_eq!(back["image_url"], "https://example.com/room1.png");
    }

    #[test]
    fn test_scored_serializes_flat() {
        let item = Item {
            id: 6,
            description: "獨立小木屋，有私人露天風呂。".to_string(),
            extra: Map::new(),
        };
        let scored = Scored { item, score: 0.87 };

        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["id"], 6);
        assert_eq!(value["score"], 0.87);
        assert_eq!(value["description"], "獨立小木屋，有私人露天風呂。");
    }

    #[test]
    fn test_missing_description_is_deserialization_error() {
        let json = r#"{"id": 2, "name": "現代雙人房"}"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }
}
