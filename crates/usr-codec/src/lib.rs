//! USR Interchange Codec
//!
//! Text block format for USR records:
//!
//! ```text
//! <segment_id=S1>
//! #hello world
//! hello	1	-	-	-	-	-	-	-
//! world	2	-	-	1:k1	-	-	-	-
//! </segment_id>
//! ```
//!
//! - [`decode_full`] / [`decode_block`]: blocks to [`usr_model::UsrRecord`]s
//! - [`decode_raw`]: blocks kept verbatim for bulk ingestion
//! - [`encode`]: a record back to its block
//! - [`parse_upload`]: a bulk upload, block text or JSON lines
//!
//! # Example
//!
//! ```rust
//! use usr_codec::{decode_block, encode};
//!
//! let text = "<segment_id=S1>\n#hi\nhi\t1\t-\t-\t-\t-\t-\t-\t-\n</segment_id>";
//! let block = decode_block(text).unwrap();
//! assert_eq!(encode(&block.record, "S1", "hi"), text);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod block;
pub mod decode;
pub mod encode;
pub mod error;
pub mod ingest;
pub mod reference;

// Re-exports
pub use block::{contains_block_tag, scan_blocks, BlockTag};
pub use decode::{
    decode_block, decode_full, decode_raw, DecodeMode, Decoded, DecodedBlock, Decoder, Marker,
    RawRecord,
};
pub use encode::{encode, Encoder};
pub use error::{DecodeError, EntryLineFault, IngestError, ReferenceFault};
pub use ingest::{extract_segment_id, materialize, parse_upload, UploadItem, UsrUpload};
pub use reference::Reference;

/// Prelude for common imports
pub mod prelude {
    pub use crate::decode::{decode_block, decode_full, decode_raw, DecodeMode, Decoder};
    pub use crate::encode::{encode, Encoder};
    pub use crate::error::{DecodeError, IngestError};
    pub use crate::ingest::{parse_upload, UsrUpload};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
