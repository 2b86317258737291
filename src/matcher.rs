//! Matching and processing: running compiled templates against data lines.
//!
//! `matches` is a pure predicate against the compiled pattern; `process`
//! walks the field descriptors and extracts values, failing fast with a
//! located diagnostic on the first field that rejects the line. Group
//! operations zip schemas to lines positionally; candidate selection probes
//! with the cheap predicate first and only pays for field-accurate
//! diagnostics when every candidate has missed.

use crate::context::Context;
use crate::error::{MatchError, ProcessError, ProcessErrorKind};
use crate::field::FieldKind;
use crate::record::{Record, Value};
use crate::template::{LineTemplate, Template};

impl LineTemplate {
    /// Does `line` satisfy this template's compiled pattern?
    ///
    /// Pure and deterministic; no side effects.
    pub fn matches(&self, line: &str) -> bool {
        self.pattern().is_match(line)
    }

    /// Extract a [`Record`] from `line`, slicing each field's columns in
    /// order.
    ///
    /// Fails fast: the first field that rejects the line aborts the call
    /// and no later fields are examined. An offset exactly at end of line
    /// yields an empty slice; only an offset past the end is an
    /// [`ProcessErrorKind::UnexpectedEndOfLine`].
    pub fn process(&self, line: &str, context: &Context) -> Result<Record, ProcessError> {
        let mut record = Record::new();
        let mut pos = 0;
        let line_len = line.chars().count();
        for field in self.fields() {
            let Some(slice) = slice_chars(line, pos, field.width, line_len) else {
                return Err(self.locate(
                    ProcessErrorKind::UnexpectedEndOfLine,
                    line,
                    pos,
                    field.width,
                    context,
                ));
            };
            match field.kind {
                FieldKind::Literal => {
                    let expected = field.literal.as_deref().unwrap_or_default();
                    if slice != expected {
                        return Err(self.locate(
                            ProcessErrorKind::LiteralMismatch {
                                expected: expected.to_string(),
                                actual: slice.to_string(),
                            },
                            line,
                            pos,
                            field.width,
                            context,
                        ));
                    }
                    // A renamed literal contributes its raw matched text.
                    if let Some(name) = &field.name {
                        record.insert(name.clone(), Value::Text(slice.to_string()));
                    }
                }
                FieldKind::Ignored => {}
                FieldKind::Text => {
                    if let Some(name) = &field.name {
                        let trimmed = slice.trim();
                        if !trimmed.is_empty() {
                            record.insert(name.clone(), Value::Text(trimmed.to_string()));
                        }
                    }
                }
                FieldKind::Integer => {
                    if let Some(name) = &field.name {
                        let trimmed = slice.trim();
                        if trimmed.is_empty() {
                            // Present but blank: kept, unlike blank text.
                            record.insert(name.clone(), Value::Blank);
                        } else {
                            let digits = trimmed.trim_start_matches('0');
                            let digits = if digits.is_empty() { "0" } else { digits };
                            match digits.parse::<i64>() {
                                Ok(n) => record.insert(name.clone(), Value::Int(n)),
                                Err(_) => {
                                    return Err(self.locate(
                                        ProcessErrorKind::InvalidInteger {
                                            text: trimmed.to_string(),
                                        },
                                        line,
                                        pos,
                                        field.width,
                                        context,
                                    ));
                                }
                            }
                        }
                    }
                }
            }
            pos += field.width;
        }
        Ok(record)
    }

    fn locate(
        &self,
        kind: ProcessErrorKind,
        line: &str,
        offset: usize,
        width: usize,
        context: &Context,
    ) -> ProcessError {
        ProcessError::new(kind, self.display_source(), line, offset, width, context)
    }
}

impl Template {
    /// Process `lines` against this group's line templates positionally,
    /// merging the per-line records into one.
    ///
    /// Line `i` is processed by template `i`; missing trailing lines are
    /// treated as empty. A duplicated field name keeps its earliest
    /// extraction. The first failing pair aborts the whole call.
    pub fn process_lines(&self, lines: &[&str], context: &Context) -> Result<Record, ProcessError> {
        let mut record = Record::new();
        for (i, template) in self.lines().iter().enumerate() {
            let line = lines.get(i).copied().unwrap_or("");
            for (name, value) in template.process(line, context)? {
                record.insert_new(name, value);
            }
        }
        Ok(record)
    }

    /// Does every line template match its positional line? A pure probe:
    /// callers use it to test whether this multi-line layout applies to a
    /// block of input without committing to processing it.
    pub fn matches_lines(&self, lines: &[&str]) -> bool {
        lines.len() >= self.len()
            && self
                .lines()
                .iter()
                .zip(lines)
                .all(|(template, line)| template.matches(line))
    }

    /// Treat this group's line templates as candidates and process `line`
    /// with the first one whose pattern matches.
    ///
    /// The winning candidate's own processing failure, if any, propagates
    /// unchanged. When no candidate matches, every candidate is re-processed
    /// with its failure collected rather than propagated, and the aggregate
    /// is returned so the caller sees why each one missed. The second pass
    /// exists because field-accurate diagnostics cost more than the boolean
    /// probe and are only worth paying for when a miss must be explained.
    pub fn process_any(&self, line: &str, context: &Context) -> Result<Record, MatchError> {
        for template in self.lines() {
            if template.matches(line) {
                return template.process(line, context).map_err(MatchError::from);
            }
        }
        let failures = self
            .lines()
            .iter()
            .map(|template| match template.process(line, context) {
                Err(e) => e,
                // The descriptor walk is more lenient than the compiled
                // pattern on short input; the aggregate still needs one
                // entry for this candidate.
                Ok(_) => ProcessError::new(
                    ProcessErrorKind::PatternMismatch,
                    template.display_source(),
                    line,
                    0,
                    0,
                    context,
                ),
            })
            .collect();
        Err(MatchError::NoCandidateMatched(failures))
    }
}

/// Up to `width` characters of `line` starting at character `start`, or
/// `None` when `start` lies past the end of the line.
fn slice_chars(line: &str, start: usize, width: usize, line_len: usize) -> Option<&str> {
    if start > line_len {
        return None;
    }
    let begin = byte_offset(line, start);
    let end = byte_offset(line, (start + width).min(line_len));
    Some(&line[begin..end])
}

fn byte_offset(line: &str, char_idx: usize) -> usize {
    line.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}
