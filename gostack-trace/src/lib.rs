//! Parses Go runtime crash output into a typed, queryable snapshot.
//!
//! The Go runtime prints panics and unhandled signals as a textual
//! traceback of every goroutine, and the race detector prints its findings
//! in a similar sub-language. This crate recognizes both from a byte
//! stream, forwards everything else to a sidecar sink, and produces a
//! [`Snapshot`] for downstream tooling to render, deduplicate or
//! aggregate. With [`ScanOpts::guess_paths`] set, the reported source paths
//! are mapped back to files on the local machine.
//!
//! # Examples
//!
//! ```
//! use gostack_trace::{ScanOpts, Snapshot};
//!
//! let input = "panic: boom\n\
//!     \n\
//!     goroutine 1 [running]:\n\
//!     main.main()\n\
//!     \t/app/main.go:12 +0x20\n";
//!
//! let mut junk = Vec::new();
//! let snapshot = Snapshot::scan(input.as_bytes(), &mut junk, &ScanOpts::default())
//!     .expect("the trace is well-formed")
//!     .expect("the input contains a traceback");
//!
//! assert_eq!(snapshot.goroutines.len(), 1);
//! assert_eq!(snapshot.goroutines[0].signature.state, "running");
//! assert_eq!(junk, b"panic: boom\n\n");
//! ```
//!
//! # Features
//!
//! - `serde` (optional): Implements `serde::Deserialize` and
//!   `serde::Serialize` for all model types.

#![warn(missing_docs)]

mod error;
mod model;
mod parse;
mod resolve;
mod scan;

pub use crate::error::{ScanError, ScanErrorKind};
pub use crate::model::*;
pub use crate::parse::ScanOpts;
pub use crate::resolve::SearchRoots;
