//! In-memory service for tests and offline editing

use super::{ConceptCandidate, Result, Segment, UsrAssignment, UsrService};
use crate::error::ServiceError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use usr_codec::UsrUpload;
use usr_model::{search_term, UsrRecord};

#[derive(Debug, Default)]
struct State {
    assignments: HashMap<String, UsrAssignment>,
    created: Vec<(String, UsrUpload)>,
    submitted: Vec<String>,
    update_count: usize,
}

/// Service that keeps everything in process memory
#[derive(Debug, Default)]
pub struct InMemoryUsrService {
    state: Mutex<State>,
    concepts: Vec<ConceptCandidate>,
    chapters: HashMap<String, Vec<Segment>>,
    rejected_segments: HashSet<String>,
}

impl InMemoryUsrService {
    /// Create new empty service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an assignment available for loading
    #[must_use]
    pub fn with_assignment(mut self, usr_id: impl Into<String>, assignment: UsrAssignment) -> Self {
        self.state
            .get_mut()
            .assignments
            .insert(usr_id.into(), assignment);
        self
    }

    /// With a concept dictionary for search
    #[must_use]
    pub fn with_concepts(mut self, concepts: Vec<ConceptCandidate>) -> Self {
        self.concepts = concepts;
        self
    }

    /// With a chapter and its segments
    #[must_use]
    pub fn with_chapter(mut self, chapter_id: impl Into<String>, segments: Vec<Segment>) -> Self {
        self.chapters.insert(chapter_id.into(), segments);
        self
    }

    /// Refuse uploads for a segment
    #[must_use]
    pub fn with_rejected_segment(mut self, segment_id: impl Into<String>) -> Self {
        self.rejected_segments.insert(segment_id.into());
        self
    }

    /// Stored record for an id
    pub async fn stored(&self, usr_id: &str) -> Option<UsrRecord> {
        self.state
            .lock()
            .await
            .assignments
            .get(usr_id)
            .map(|a| a.usr.record.clone())
    }

    /// Uploads accepted so far, in order
    pub async fn created(&self) -> Vec<(String, UsrUpload)> {
        self.state.lock().await.created.clone()
    }

    /// Ids submitted for review
    pub async fn submitted(&self) -> Vec<String> {
        self.state.lock().await.submitted.clone()
    }

    /// Number of successful updates
    pub async fn update_count(&self) -> usize {
        self.state.lock().await.update_count
    }
}

#[async_trait]
impl UsrService for InMemoryUsrService {
    async fn load_usr(&self, usr_id: &str) -> Result<UsrAssignment> {
        self.state
            .lock()
            .await
            .assignments
            .get(usr_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(usr_id.to_string()))
    }

    async fn update_usr(&self, usr_id: &str, record: &UsrRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        let assignment = state
            .assignments
            .get_mut(usr_id)
            .ok_or_else(|| ServiceError::NotFound(usr_id.to_string()))?;
        assignment.usr.record = record.clone();
        state.update_count += 1;
        Ok(())
    }

    async fn submit_usr(&self, usr_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.assignments.contains_key(usr_id) {
            return Err(ServiceError::NotFound(usr_id.to_string()));
        }
        state.submitted.push(usr_id.to_string());
        Ok(())
    }

    async fn create_usr(&self, segment_id: &str, upload: &UsrUpload) -> Result<()> {
        if self.rejected_segments.contains(segment_id) {
            return Err(ServiceError::Rejected(format!("segment {segment_id}")));
        }
        self.state
            .lock()
            .await
            .created
            .push((segment_id.to_string(), upload.clone()));
        Ok(())
    }

    async fn list_segments(&self, chapter_id: &str) -> Result<Vec<Segment>> {
        self.chapters
            .get(chapter_id)
            .cloned()
            .ok_or_else(|| ServiceError::ChapterNotFound(chapter_id.to_string()))
    }

    async fn search_concepts(&self, term: &str, _language: &str) -> Result<Vec<ConceptCandidate>> {
        Ok(self
            .concepts
            .iter()
            .filter(|c| search_term(&c.concept_label).starts_with(term))
            .cloned()
            .collect())
    }
}
