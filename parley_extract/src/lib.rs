#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Structured-output extraction for model replies.
//!
//! Models asked for JSON do not always answer with JSON alone. A reply may
//! wrap the object in markdown fences, surround it with prose, or use
//! single-quoted pseudo-JSON. [`extract`] runs a layered fallback chain and
//! always returns presentable display text plus a [`StructuredSummary`]:
//!
//! 1. Direct parse of the fence-stripped reply
//! 2. Embedded object between the first `{` and the last `}`
//! 3. Quote repair of that span
//! 4. Fallback summary with `ok = false`
//!
//! Every step is a pure function exported from [`clean`] or [`repair`] so it
//! can be tested on its own.
//!
//! [`StructuredSummary`]: parley_core::StructuredSummary

pub mod clean;
mod pipeline;
pub mod repair;

pub use pipeline::{Extraction, ExtractionLayer, PLACEHOLDER, extract};
