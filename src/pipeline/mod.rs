//! Pipeline stages for document transformation.
//!
//! Each submodule implements exactly one step. Keeping stages separate makes
//! each independently testable and lets us swap implementations without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ transform ──▶ assemble
//! (upload)   (split)   (model)       (join + metadata)
//!    │
//!    └─────▶ small                 (single-call path)
//! ```
//!
//! 1. [`input`]     — owning guard for the temporary uploaded file
//! 2. [`chunk`]     — split oversized text on sentence boundaries under a
//!    token budget
//! 3. [`transform`] — drive the sequential per-chunk model calls; the only
//!    stage with tolerated failures
//! 4. [`assemble`]  — join outputs in order and synthesise title/tags/summary
//! 5. [`small`]     — single structured call used when content fits the
//!    input budget
//! 6. [`parse`]     — strict-parse-then-fallback for model replies that are
//!    sometimes JSON and sometimes free text
//! 7. [`postprocess`] — deterministic cleanup of model-produced Markdown

pub mod assemble;
pub mod chunk;
pub mod input;
pub mod parse;
pub mod postprocess;
pub mod small;
pub mod transform;
