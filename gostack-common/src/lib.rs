//! Common functionality for the `gostack` crates.
//!
//! This crate exposes string-level utilities shared by the trace parser and
//! its consumers:
//!
//!  - Functions to split, join and normalize source paths the way the Go
//!    runtime prints them (always `/`-separated, regardless of the host).
//!  - [`decode_escapes`]: decoding of the `%xx` escapes the Go compiler
//!    embeds in symbol names for characters that are not valid in object
//!    file symbols.
//!
//! None of these functions touch the filesystem.

#![warn(missing_docs)]

mod path;
mod symbol;

pub use crate::path::*;
pub use crate::symbol::*;
