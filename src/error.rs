//! Error taxonomy and the position-pointing diagnostic reports.
//!
//! Compile-time template errors (`CompileError`) are raised when a template
//! is compiled, never deferred to first use. Runtime errors carry enough
//! structured data (offset, width, expected/actual text) for callers to build
//! custom reporting; `Display` provides the default human-readable rendering
//! with a caret line under the offending span.

use std::fmt;
use std::fmt::Write as _;

use thiserror::Error;

use crate::context::Context;

/// Separator between per-candidate reports in an aggregated failure.
const CANDIDATE_SEPARATOR: &str =
    "-----------------------------------------------------------";

/// A malformed template line, detected at compile time.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// A `<:` / `<#` rename directive was opened but never closed with `>`.
    #[error("unterminated rename directive at column {column} in {template:?}")]
    UnterminatedDirective { template: String, column: usize },

    /// A rename directive contained a character that is neither part of a
    /// name nor the closing `>`.
    #[error("unknown marker character {found:?} at column {column} in {template:?}")]
    UnknownMarker {
        template: String,
        found: char,
        column: usize,
    },

    /// The derived matching pattern failed to compile.
    #[error("invalid matching pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// What went wrong while processing one line against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessErrorKind {
    /// The line ended before the field's columns.
    UnexpectedEndOfLine,
    /// A literal field's columns did not hold the expected text.
    LiteralMismatch { expected: String, actual: String },
    /// An integer field's non-blank content failed numeric parsing.
    InvalidInteger { text: String },
    /// The line was rejected by the compiled pattern even though the
    /// field-by-field walk found nothing wrong. Only produced while
    /// diagnosing candidates that already failed the match predicate.
    PatternMismatch,
}

impl ProcessErrorKind {
    fn headline(&self) -> String {
        match self {
            ProcessErrorKind::UnexpectedEndOfLine => "Unexpected end of line".to_string(),
            ProcessErrorKind::LiteralMismatch { expected, actual } => {
                format!("Mismatch: {:?} should be {:?}", actual, expected)
            }
            ProcessErrorKind::InvalidInteger { text } => {
                format!("Invalid integer {:?}", text)
            }
            ProcessErrorKind::PatternMismatch => {
                "Line does not match the compiled pattern".to_string()
            }
        }
    }
}

/// A located processing failure: one field of one line template rejected one
/// input line.
///
/// `Display` renders the full report: headline, the template (rename markers
/// already stripped), the offending line, a caret line under the offending
/// span, and the caller's source context.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessError {
    kind: ProcessErrorKind,
    template: String,
    line: String,
    offset: usize,
    width: usize,
    context: Context,
}

impl ProcessError {
    pub(crate) fn new(
        kind: ProcessErrorKind,
        template: impl Into<String>,
        line: impl Into<String>,
        offset: usize,
        width: usize,
        context: &Context,
    ) -> Self {
        ProcessError {
            kind,
            template: template.into(),
            line: line.into(),
            offset,
            width,
            context: context.clone(),
        }
    }

    pub fn kind(&self) -> &ProcessErrorKind {
        &self.kind
    }

    /// The template line this failure belongs to, with rename markers
    /// stripped for legibility.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The full input line that was rejected.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Character offset where the mismatch starts.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Width of the offending field.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.kind.headline())?;
        writeln!(f, "  {:?}", self.template)?;
        writeln!(f, "  {:?}", self.line)?;
        // The extra leading space accounts for the opening quote above.
        writeln!(
            f,
            "   {}{}",
            " ".repeat(self.offset),
            "^".repeat(self.width.max(1))
        )?;
        let file = self.context.file.as_deref().unwrap_or("");
        let line_num = self
            .context
            .line_num
            .map(|n| n.to_string())
            .unwrap_or_default();
        write!(f, "  file: {} @ {}", file, line_num)?;
        if let Some(excerpt) = &self.context.excerpt {
            write!(f, "\n\n{}", excerpt)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProcessError {}

fn no_candidate_report(failures: &[ProcessError]) -> String {
    let mut out = format!("no candidate layout matched ({} tried)", failures.len());
    for failure in failures {
        let _ = write!(out, "\n{}\n{}", CANDIDATE_SEPARATOR, failure);
    }
    out
}

/// Failure of a candidate-selection match.
///
/// When a candidate's pattern matched but its processing then failed, the
/// single `Process` failure propagates unchanged. When no candidate matched
/// at all, every candidate is diagnosed and the failures are aggregated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("{}", no_candidate_report(.0))]
    NoCandidateMatched(Vec<ProcessError>),
}

impl MatchError {
    /// The per-candidate failures of an aggregated miss, if any.
    pub fn candidate_failures(&self) -> &[ProcessError] {
        match self {
            MatchError::Process(_) => &[],
            MatchError::NoCandidateMatched(failures) => failures,
        }
    }
}

/// Failure of best-fit rendering: no candidate layout could hold every value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("no format layout fits the record ({tried} tried)")]
    NoFormatterFits { tried: usize },
}
