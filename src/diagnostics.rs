//! Diagnostic Infrastructure
//!
//! Infrastructure for collecting and formatting the static diagnostics this
//! pass can produce. The only fatal static error is a duplicate private-name
//! declaration within one class body; it aborts lowering of that class while
//! the rest of the compilation unit proceeds.
//!
//! Runtime errors of the *emitted* program (redeclaration, invalid access,
//! missing setter) are not diagnostics — see [`crate::runtime`].

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// A hint (lowest severity)
    Hint = 4,
    /// Informational message
    Info = 3,
    /// A warning
    Warning = 2,
    /// An error (highest severity)
    Error = 1,
}

impl DiagnosticSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Hint => "hint",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A diagnostic message with location, severity, and error code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
    pub code: u32,
    pub severity: DiagnosticSeverity,
}

impl Diagnostic {
    pub fn error(span: Span, message: impl Into<String>, code: u32) -> Self {
        Diagnostic {
            span,
            message: message.into(),
            code,
            severity: DiagnosticSeverity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} TS{}: {}", self.severity, self.code, self.message)
    }
}

/// A collection of diagnostics for one lowering pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        DiagnosticBag::default()
    }

    pub fn error(&mut self, span: Span, message: impl Into<String>, code: u32) {
        self.diagnostics.push(Diagnostic::error(span, message, code));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_collects_errors() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.has_errors());
        bag.error(Span::new(0, 4), "duplicate private name '#x'", 2300);
        assert!(bag.has_errors());
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_bag_serializes_to_json() {
        let mut bag = DiagnosticBag::new();
        bag.error(Span::new(3, 7), "duplicate private name '#x' in class 'A'", 2300);
        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(json["diagnostics"][0]["code"], 2300);
        assert_eq!(json["diagnostics"][0]["severity"], "error");
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error(Span::synthesized(), "duplicate private name '#x'", 2300);
        assert_eq!(d.to_string(), "error TS2300: duplicate private name '#x'");
    }
}
