//! Source position tracking for the Quill programming language.
//!
//! This crate provides the fundamental types for talking about locations in
//! source code throughout the Quill compiler pipeline: positions, spans, the
//! comments attached to a piece of syntax, and the `SourceAnn` annotation
//! pair carried by every declaration.
//!
//! Spans produced by the parser always point into a real file; code that the
//! compiler synthesizes during desugaring carries the reserved generated
//! span instead, so diagnostics can tell the two apart.

pub mod types;
