//! CLI module for the alumni-hub command-line interface.
//!
//! Command handlers run one-shot directory queries against the CMS.

mod commands;
mod output;

pub use commands::*;
