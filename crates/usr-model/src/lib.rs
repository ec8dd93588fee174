//! USR Record Model
//!
//! The Universal Semantic Representation of one text segment: four parallel
//! layers over the segment's tokens, plus sentence-level metadata.
//!
//! # Core Concepts
//!
//! - [`UsrRecord`]: the four layers plus `sentence_type` and scope
//! - [`TokenIndex`]: positional key shared by every layer
//! - [`EntryId`]: stable identity of a token's entries across layers
//! - [`Vocabulary`]: the closed tables for enum-typed fields
//! - [`ConceptKind`]: free lexical concept vs. bracketed construction pattern
//!
//! # Example
//!
//! ```rust
//! use usr_model::{EntryId, LexicalEntry, TokenIndex, UsrRecord};
//!
//! let mut record = UsrRecord::new();
//! record.lexical_info.push(LexicalEntry::new(
//!     EntryId::generate(),
//!     "BUkampa_1",
//!     TokenIndex::new(1),
//! ));
//! assert_eq!(record.next_index(), TokenIndex::new(2));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod concept;
pub mod entry;
pub mod error;
pub mod index;
pub mod record;
pub mod vocab;

// Re-exports
pub use concept::{is_construction_pattern, search_term, validate_concept, ConceptKind};
pub use entry::{ConstructionEntry, LexicalEntry, LinkedEntry, RelationEntry};
pub use error::ModelError;
pub use index::{EntryId, TokenIndex};
pub use record::{Layer, SentenceType, SentenceTypeInfo, UsrRecord};
pub use vocab::{is_defined_construction_pattern, normalize_unset, Vocabulary, UNSET};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
