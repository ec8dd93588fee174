//! External USR service boundary
//!
//! Loading, saving and creating records all go through [`UsrService`]. The
//! service is authoritative: it owns persistence, workflow state and the
//! final parse of raw uploads.

pub mod http;
pub mod memory;

pub use http::HttpUsrService;
pub use memory::InMemoryUsrService;

use crate::error::ServiceError;
use crate::permissions::SectionPermissions;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use usr_codec::UsrUpload;
use usr_model::UsrRecord;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Search language when the stored record names none
pub const DEFAULT_LANGUAGE: &str = "hindi";

/// A record as stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredUsr {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(flatten)]
    pub record: UsrRecord,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n.to_string()),
        Some(Raw::Text(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// The segment a record annotates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Database id, the target of record creation
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Human-readable id used in `<segment_id=...>` tags
    #[serde(default, deserialize_with = "string_or_number")]
    pub segment_id: Option<String>,
    #[serde(default)]
    pub text: String,
    /// WX transliteration
    #[serde(default)]
    pub wxtext: Option<String>,
    #[serde(default)]
    pub englishtext: Option<String>,
}

impl Segment {
    /// Does the segment carry this tag id? Surrounding whitespace is ignored.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.segment_id
            .as_deref()
            .is_some_and(|id| id.trim() == tag.trim())
    }
}

/// Response to a load: the record, its segment and the annotator's grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsrAssignment {
    pub usr: StoredUsr,
    #[serde(default)]
    pub segment: Segment,
    #[serde(default)]
    pub permissions: SectionPermissions,
}

impl UsrAssignment {
    /// Concept-search language of the record
    #[must_use]
    pub fn language(&self) -> &str {
        self.usr.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

/// Concept-search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptCandidate {
    pub concept_label: String,
    #[serde(default)]
    pub hindi_label: Option<String>,
    #[serde(default)]
    pub english_label: Option<String>,
}

impl ConceptCandidate {
    /// `hindi (english)`, falling back to the concept label
    #[must_use]
    pub fn display_label(&self) -> String {
        let base = self
            .hindi_label
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(&self.concept_label);
        match self.english_label.as_deref().filter(|e| !e.is_empty()) {
            Some(english) => format!("{base} ({english})"),
            None => base.to_string(),
        }
    }
}

/// Operations offered by the external USR service
#[async_trait]
pub trait UsrService: Send + Sync {
    /// Record, segment and permissions for an assignment
    async fn load_usr(&self, usr_id: &str) -> Result<UsrAssignment>;

    /// Replace the stored record
    async fn update_usr(&self, usr_id: &str, record: &UsrRecord) -> Result<()>;

    /// Hand the record on for review
    async fn submit_usr(&self, usr_id: &str) -> Result<()>;

    /// Create a record for a segment from raw text or JSON
    ///
    /// `segment_id` is the segment's database id.
    async fn create_usr(&self, segment_id: &str, upload: &UsrUpload) -> Result<()>;

    /// Segments of a chapter, in chapter order
    async fn list_segments(&self, chapter_id: &str) -> Result<Vec<Segment>>;

    /// Search the concept dictionary; `term` is already normalized
    async fn search_concepts(&self, term: &str, language: &str) -> Result<Vec<ConceptCandidate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_from_service_json() {
        let json = r#"{
            "usr": {"id": 42, "sentence_type": "declarative",
                    "lexical_info": [{"id": 7, "concept": "BUkampa_1", "index": 1}]},
            "segment": {"segment_id": "Geo_1", "text": "भूकंप", "wxtext": "BUkaMpa"},
            "permissions": {"assign_lexical": true}
        }"#;
        let assignment: UsrAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(assignment.usr.id.as_deref(), Some("42"));
        assert_eq!(assignment.language(), "hindi");
        assert_eq!(assignment.usr.record.lexical_info[0].id.as_str(), "7");
        assert_eq!(assignment.segment.segment_id.as_deref(), Some("Geo_1"));
        assert!(assignment.permissions.lexical);
        assert!(!assignment.permissions.dependency);
    }

    #[test]
    fn segment_list_from_service_json() {
        let json = r#"[
            {"id": 12, "segment_id": " Geo_1 ", "text": "a"},
            {"id": "13", "segment_id": null, "text": "b"}
        ]"#;
        let segments: Vec<Segment> = serde_json::from_str(json).unwrap();
        assert_eq!(segments[0].id.as_deref(), Some("12"));
        assert!(segments[0].has_tag("Geo_1"));
        assert!(!segments[0].has_tag("Geo_2"));
        assert_eq!(segments[1].id.as_deref(), Some("13"));
        assert!(!segments[1].has_tag(""));
    }

    #[test]
    fn candidate_labels() {
        let full = ConceptCandidate {
            concept_label: "BUkampa_1".to_string(),
            hindi_label: Some("भूकंप".to_string()),
            english_label: Some("earthquake".to_string()),
        };
        assert_eq!(full.display_label(), "भूकंप (earthquake)");

        let bare = ConceptCandidate {
            concept_label: "BUkampa_1".to_string(),
            hindi_label: None,
            english_label: Some(String::new()),
        };
        assert_eq!(bare.display_label(), "BUkampa_1");
    }
}
