//! USR Consistency Engine
//!
//! Editing layer over [`usr_model::UsrRecord`]:
//!
//! - [`ConsistencyEngine`]: permission-checked, cross-layer-consistent edits
//! - [`ValidationReport`]: field-level issues; blocking ones stop commits
//! - [`UsrService`]: the external service, over HTTP or in memory
//! - [`SessionLoader`] / [`EditSession`]: load, edit, commit
//! - [`BulkUploader`]: send a parsed upload, count successes and failures
//!
//! # Example
//!
//! ```rust
//! use usr_engine::{ConsistencyEngine, FieldEdit, SectionPermissions};
//! use usr_model::{Layer, UsrRecord};
//!
//! let mut engine = ConsistencyEngine::new(UsrRecord::new(), SectionPermissions::all());
//! let id = engine.add_item().unwrap();
//! engine.rename_concept(&id, "BUkampa_1").unwrap();
//! engine
//!     .set_field(Layer::Lexical, &id, FieldEdit::MorphoSemantic(Some("pl".into())))
//!     .unwrap();
//!
//! let payload = engine.commit_payload().unwrap();
//! assert_eq!(payload.dependency_info.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod bulk;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod permissions;
pub mod service;
pub mod session;
pub mod validation;

// Re-exports
pub use bulk::{BulkUploader, IngestFailure, IngestReport};
pub use config::{DanglingPolicy, ServiceConfig, WorkbenchConfig};
pub use engine::ConsistencyEngine;
pub use error::{ConfigError, EngineError, ServiceError, SessionError};
pub use field::{EntryRef, FieldEdit};
pub use permissions::SectionPermissions;
pub use service::{
    ConceptCandidate, HttpUsrService, InMemoryUsrService, Segment, StoredUsr, UsrAssignment,
    UsrService,
};
pub use session::{EditSession, LoadTicket, SessionLoader};
pub use validation::{IssueKind, ValidationIssue, ValidationReport};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::{DanglingPolicy, WorkbenchConfig};
    pub use crate::engine::ConsistencyEngine;
    pub use crate::error::{EngineError, SessionError};
    pub use crate::field::{EntryRef, FieldEdit};
    pub use crate::permissions::SectionPermissions;
    pub use crate::service::UsrService;
    pub use crate::session::{EditSession, SessionLoader};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
