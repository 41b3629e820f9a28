//! # layer-lint-core
//!
//! Shared types for layer-lint: the [`Violation`] a boundary check
//! produces, the [`Span`]/[`Location`] it points at, and the aggregated
//! [`LintResult`] a host reports.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod types;

pub use types::{LintResult, Location, Severity, Span, Violation, ViolationDiagnostic};
