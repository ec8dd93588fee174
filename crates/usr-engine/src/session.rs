//! Edit sessions
//!
//! [`SessionLoader`] turns an assignment into an [`EditSession`] once the
//! load completes. Every new load, or [`SessionLoader::cancel`], bumps a
//! generation counter; a load that finishes under an older generation is
//! discarded as [`SessionError::Stale`].
//!
//! [`EditSession::commit`] borrows the session mutably until the service
//! answers, so one session never has two commits in flight.

use crate::config::WorkbenchConfig;
use crate::engine::ConsistencyEngine;
use crate::error::SessionError;
use crate::service::{ConceptCandidate, Segment, UsrService};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use usr_model::{search_term, UsrRecord};

/// A load in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    usr_id: String,
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn usr_id(&self) -> &str {
        &self.usr_id
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Opens edit sessions against a service
pub struct SessionLoader {
    service: Arc<dyn UsrService>,
    config: WorkbenchConfig,
    generation: AtomicU64,
}

impl SessionLoader {
    /// Create new loader
    #[must_use]
    pub fn new(service: Arc<dyn UsrService>, config: WorkbenchConfig) -> Self {
        Self {
            service,
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Current generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a load; supersedes every earlier ticket
    pub fn begin(&self, usr_id: impl Into<String>) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            usr_id: usr_id.into(),
            generation,
        }
    }

    /// Navigate away: loads in flight will be discarded
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Finish a load
    ///
    /// # Errors
    /// [`SessionError::Service`] when the load fails, [`SessionError::Stale`]
    /// when the ticket was superseded while awaiting
    pub async fn fetch(&self, ticket: LoadTicket) -> Result<EditSession, SessionError> {
        let assignment = self.service.load_usr(&ticket.usr_id).await?;

        let current = self.generation();
        if current != ticket.generation {
            warn!(
                usr_id = %ticket.usr_id,
                generation = ticket.generation,
                current,
                "discarding stale load"
            );
            return Err(SessionError::Stale {
                usr_id: ticket.usr_id,
                generation: ticket.generation,
                current,
            });
        }

        let language = assignment
            .usr
            .language
            .clone()
            .unwrap_or_else(|| self.config.language.clone());
        let engine = ConsistencyEngine::new(assignment.usr.record, assignment.permissions)
            .with_dangling_policy(self.config.dangling_policy);

        info!(
            usr_id = %ticket.usr_id,
            tokens = engine.record().lexical_info.len(),
            "loaded usr"
        );

        Ok(EditSession {
            usr_id: ticket.usr_id,
            service: Arc::clone(&self.service),
            engine,
            segment: assignment.segment,
            language,
        })
    }

    /// Begin and finish a load
    ///
    /// # Errors
    /// As [`SessionLoader::fetch`]
    pub async fn load(&self, usr_id: impl Into<String>) -> Result<EditSession, SessionError> {
        let ticket = self.begin(usr_id);
        self.fetch(ticket).await
    }
}

/// One record open for editing
pub struct EditSession {
    usr_id: String,
    service: Arc<dyn UsrService>,
    engine: ConsistencyEngine,
    segment: Segment,
    language: String,
}

impl EditSession {
    #[must_use]
    pub fn usr_id(&self) -> &str {
        &self.usr_id
    }

    #[must_use]
    pub fn engine(&self) -> &ConsistencyEngine {
        &self.engine
    }

    /// Mutation surface for the record
    pub fn engine_mut(&mut self) -> &mut ConsistencyEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Read-only block text of the record under edit
    #[must_use]
    pub fn display_text(&self) -> String {
        let segment_id = self.segment.segment_id.as_deref().unwrap_or(&self.usr_id);
        usr_codec::encode(self.engine.record(), segment_id, &self.segment.text)
    }

    /// Send the commit payload to the service
    ///
    /// Returns the record that was sent.
    ///
    /// # Errors
    /// [`SessionError::Engine`] when validation blocks the commit,
    /// [`SessionError::Service`] when the service rejects it
    pub async fn commit(&mut self) -> Result<UsrRecord, SessionError> {
        let payload = self.engine.commit_payload()?;
        self.service.update_usr(&self.usr_id, &payload).await?;
        self.engine.mark_clean();
        info!(usr_id = %self.usr_id, tokens = payload.lexical_info.len(), "committed usr");
        Ok(payload)
    }

    /// Submit the record for review
    ///
    /// # Errors
    /// [`SessionError::Service`]
    pub async fn submit(&self) -> Result<(), SessionError> {
        self.service.submit_usr(&self.usr_id).await?;
        info!(usr_id = %self.usr_id, "submitted usr for review");
        Ok(())
    }

    /// Search concepts for a term or an existing concept
    ///
    /// A trailing `_<digits>` sense suffix is dropped before searching.
    ///
    /// # Errors
    /// [`SessionError::Service`]
    pub async fn search_concepts(&self, term: &str) -> Result<Vec<ConceptCandidate>, SessionError> {
        let term = search_term(term.trim());
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.service.search_concepts(term, &self.language).await?)
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("usr_id", &self.usr_id)
            .field("engine", &self.engine)
            .field("segment", &self.segment)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}
