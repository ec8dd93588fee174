//! USR command-line front end
//!
//! Each subcommand of the `usr` binary is a function here returning a
//! [`CommandOutput`]; the binary only parses arguments, sets up logging and
//! prints.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;

// Re-exports
pub use commands::{
    check_command, decode_command, encode_command, load_config, plan_upload, read_input,
    upload_command, upload_with, vocab_command, CommandOutput, LogFormat,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
