use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdeaflowError;

/// Broad bucket an idea is filed under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Work,
    Personal,
    Creative,
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Personal,
        Category::Creative,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Creative => "Creative",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = IdeaflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                IdeaflowError::Config(format!(
                    "Invalid category: {}. Must be one of: Work, Personal, Creative, Other",
                    s
                ))
            })
    }
}

/// A single captured idea as stored in the vault
///
/// The serialized shape (camelCase keys, optional fields omitted when unset)
/// is also the backup file format. Every field falls back to its default when
/// missing so that records written before a field existed still load. Keys
/// this type does not know, such as `imagePrompt` in older backups, ride
/// along in `extra` and are written back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Idea {
    /// Unique identifier, immutable once assigned
    pub id: String,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
    pub title: String,
    /// Original captured text (editable)
    pub transcript: String,
    pub summary: String,
    /// Next steps, order preserved
    pub action_items: Vec<String>,
    pub tags: Vec<String>,
    pub category: Category,
    pub is_favorite: bool,
    /// Generated illustration, usually a `data:` URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Deep dive text, absent until requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<String>,
    /// Unrecognized keys carried through storage and backups
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Idea {
    /// First eight characters of the id, used in listings
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// Whether `id_or_prefix` names this idea
    ///
    /// Accepts the full id or any prefix of at least eight characters.
    pub fn matches_id(&self, id_or_prefix: &str) -> bool {
        self.id == id_or_prefix || (id_or_prefix.len() >= 8 && self.id.starts_with(id_or_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str_is_case_insensitive() {
        assert_eq!("work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!("CREATIVE".parse::<Category>().unwrap(), Category::Creative);
        assert_eq!(" Personal ".parse::<Category>().unwrap(), Category::Personal);
        assert!("Hobby".parse::<Category>().is_err());
    }

    #[test]
    fn test_idea_serializes_with_camel_case_keys() {
        let idea = Idea {
            id: "a".to_string(),
            created_at: 1,
            title: "X".to_string(),
            action_items: vec!["do it".to_string()],
            is_favorite: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&idea).unwrap();
        assert_eq!(value["createdAt"], 1);
        assert_eq!(value["actionItems"][0], "do it");
        assert_eq!(value["isFavorite"], true);
        assert_eq!(value["category"], "Other");
        assert!(value.get("imageUrl").is_none());
        assert!(value.get("expansion").is_none());
    }

    #[test]
    fn test_idea_without_optional_fields_deserializes() {
        let json = r#"{
            "id": "old-1",
            "createdAt": 1700000000000,
            "title": "Legacy",
            "transcript": "t",
            "summary": "s",
            "actionItems": [],
            "tags": ["a"],
            "category": "Work",
            "isFavorite": false
        }"#;
        let idea: Idea = serde_json::from_str(json).unwrap();
        assert_eq!(idea.category, Category::Work);
        assert!(idea.expansion.is_none());
        assert!(idea.image_url.is_none());
    }

    #[test]
    fn test_short_id_handles_short_ids() {
        let idea = Idea {
            id: "abc".to_string(),
            ..Default::default()
        };
        assert_eq!(idea.short_id(), "abc");

        let idea = Idea {
            id: "21173421-201f-4e56-87a0-8e13fc02f7e5".to_string(),
            ..Default::default()
        };
        assert_eq!(idea.short_id(), "21173421");
    }

    #[test]
    fn test_unknown_keys_survive_a_round_trip() {
        let raw = serde_json::json!({
            "id": "a",
            "title": "X",
            "imagePrompt": "glowing lanterns",
            "mood": { "tone": "warm" }
        });
        let idea: Idea = serde_json::from_value(raw).unwrap();
        assert_eq!(idea.title, "X");
        assert_eq!(idea.extra["imagePrompt"], "glowing lanterns");
        assert!(!idea.extra.contains_key("title"));

        let value = serde_json::to_value(&idea).unwrap();
        assert_eq!(value["imagePrompt"], "glowing lanterns");
        assert_eq!(value["mood"]["tone"], "warm");
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn test_matches_id_requires_eight_char_prefix() {
        let idea = Idea {
            id: "abcdef12-3456-7890-abcd-ef1234567890".to_string(),
            ..Default::default()
        };
        assert!(idea.matches_id("abcdef12"));
        assert!(idea.matches_id(&idea.id.clone()));
        assert!(!idea.matches_id("abc"));
        assert!(!idea.matches_id("abcdef13"));
    }
}
