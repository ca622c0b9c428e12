//! Gostack makes sense of Go runtime crash output.
//!
//! This library parses the tracebacks the Go runtime prints on panics and
//! the reports its race detector emits, turning them into a typed snapshot
//! that tooling can render, deduplicate or map back to local source files.
//! It is built to be used in parts.
//!
//! # Features
//!
//! - `trace` (default): The parser and model, re-exported as [`trace`].
//! - `trace-serde`: Implements `serde::Deserialize` and `serde::Serialize`
//!   for all model types.

#![warn(missing_docs)]

#[doc(inline)]
pub use gostack_common as common;
#[doc(inline)]
#[cfg(feature = "trace")]
pub use gostack_trace as trace;
