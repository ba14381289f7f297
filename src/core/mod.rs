// src/core/mod.rs

// Root of the `core` module: everything the assessment pipeline is made of,
// kept free of any HTTP-server concern.

/// Data structures shared across the pipeline: the canonical target, the
/// per-stage finding types and the final `AssessmentReport`.
pub mod models;

/// URL canonicalization and SSRF rejection; the pipeline's only gate.
pub mod validator;

/// Static checklist, signature tables and scoring constants.
pub mod knowledge_base;

/// The stage scanners and the orchestrator that sequences them.
pub mod scanner;

/// The pure risk-score / risk-level function.
pub mod scorer;
