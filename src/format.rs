//! Rendering records back into fixed-width text.
//!
//! Every compiled line template carries a [`FormatSpec`]: the ordered
//! rendering pieces plus the field names it consumes and each one's maximum
//! width. Rendering is the inverse of processing: a record parsed from a
//! canonical padded line renders back to that line byte for byte.

use crate::error::FormatError;
use crate::field::{Field, FieldKind};
use crate::record::{Record, Value};
use crate::template::{LineTemplate, Template};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    /// Fixed text, emitted verbatim.
    Literal(String),
    /// An ignored slot, emitted as spaces.
    Blank(usize),
    /// A named value slot. Numeric slots right-justify, text slots
    /// left-justify; both pad and truncate to the slot width.
    Slot {
        name: String,
        width: usize,
        numeric: bool,
    },
}

/// The compiled rendering template of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pieces: Vec<Piece>,
    slots: Vec<(String, usize)>,
}

impl FormatSpec {
    pub(crate) fn from_fields(fields: &[Field]) -> Self {
        let mut pieces = Vec::with_capacity(fields.len());
        let mut slots = Vec::new();
        for field in fields {
            let piece = match (field.kind, &field.name) {
                (FieldKind::Literal, _) => {
                    Piece::Literal(field.literal.clone().unwrap_or_default())
                }
                (FieldKind::Text, Some(name)) => {
                    slots.push((name.clone(), field.width));
                    Piece::Slot {
                        name: name.clone(),
                        width: field.width,
                        numeric: false,
                    }
                }
                (FieldKind::Integer, Some(name)) => {
                    slots.push((name.clone(), field.width));
                    Piece::Slot {
                        name: name.clone(),
                        width: field.width,
                        numeric: true,
                    }
                }
                _ => Piece::Blank(field.width),
            };
            pieces.push(piece);
        }
        FormatSpec { pieces, slots }
    }

    /// The field names this line consumes, in order, with each one's
    /// maximum renderable width.
    pub fn slots(&self) -> &[(String, usize)] {
        &self.slots
    }

    /// Does the record hold a value for every consumed name, and does each
    /// value render within its slot width?
    pub fn fits(&self, record: &Record) -> bool {
        self.slots.iter().all(|(name, width)| {
            record
                .get(name)
                .is_some_and(|value| value.rendered().chars().count() <= *width)
        })
    }

    pub(crate) fn render_line(&self, record: &Record) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Blank(width) => out.push_str(&" ".repeat(*width)),
                Piece::Slot {
                    name,
                    width,
                    numeric,
                } => {
                    let value = record.get(name).map(Value::rendered).unwrap_or_default();
                    out.push_str(&pad(&value, *width, *numeric));
                }
            }
        }
        out
    }
}

/// Pad or truncate `value` to exactly `width` characters.
fn pad(value: &str, width: usize, numeric: bool) -> String {
    if value.chars().count() > width {
        return value.chars().take(width).collect();
    }
    if numeric {
        format!("{:>width$}", value)
    } else {
        format!("{:<width$}", value)
    }
}

impl LineTemplate {
    /// Render `record` through this line's format descriptor. Fields the
    /// record does not hold render as blanks of their slot width.
    pub fn render(&self, record: &Record) -> String {
        self.format().render_line(record)
    }

    /// Can this line's format descriptor hold every value it consumes?
    pub fn fits(&self, record: &Record) -> bool {
        self.format().fits(record)
    }

    /// This line's compiled format descriptor.
    pub fn format_spec(&self) -> &FormatSpec {
        self.format()
    }
}

impl Template {
    /// Render `record` through every line template in order, one line
    /// terminator per line.
    pub fn render(&self, record: &Record) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line.render(record));
            out.push('\n');
        }
        out
    }

    /// Best-fit rendering: treat the line templates as a priority list and
    /// render with the first whose consumed fields all fit the record.
    pub fn render_any(&self, record: &Record) -> Result<String, FormatError> {
        self.lines()
            .iter()
            .find(|line| line.fits(record))
            .map(|line| line.render(record))
            .ok_or(FormatError::NoFormatterFits { tried: self.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn test_render_each_kind() {
        let lt = LineTemplate::compile("AB:code ]#amt  ?  ").unwrap();
        let mut record = Record::new();
        record.insert("code", Value::Text("foo".to_string()));
        record.insert("amt", Value::Int(42));
        assert_eq!(lt.render(&record), "ABfoo        42   ");
    }

    #[test]
    fn test_missing_fields_render_blank() {
        let lt = LineTemplate::compile("AB:code ]#amt  ").unwrap();
        let record = Record::new();
        assert_eq!(lt.render(&record), "AB             ");
    }

    #[test]
    fn test_blank_integer_renders_spaces() {
        let lt = LineTemplate::compile("#amt  ]").unwrap();
        let mut record = Record::new();
        record.insert("amt", Value::Blank);
        assert_eq!(lt.render(&record), "       ");
    }

    #[test]
    fn test_overlong_text_is_truncated_to_width() {
        let lt = LineTemplate::compile("X:c ]").unwrap();
        let mut record = Record::new();
        record.insert("c", Value::Text("overflow".to_string()));
        let line = lt.render(&record);
        assert_eq!(line.chars().count(), 5);
        assert_eq!(line, "Xover");
    }

    #[test]
    fn test_round_trip_of_canonical_line() {
        let template = Template::compile("AB:code ]#amt  ").unwrap();
        let line = "ABfoo        42";
        let record = template
            .process_lines(&[line], &Context::default())
            .unwrap();
        assert_eq!(template.render(&record), format!("{}\n", line));
    }

    #[test]
    fn test_round_trip_of_multi_line_record() {
        let template = Template::compile("HDR:name  ]\nDTL#qty ]").unwrap();
        let lines = ["HDRwidgets ", "DTL     7"];
        let record = template
            .process_lines(&lines, &Context::default())
            .unwrap();
        assert_eq!(template.render(&record), "HDRwidgets \nDTL     7\n");
    }

    #[test]
    fn test_fits_requires_presence_and_width() {
        let lt = LineTemplate::compile(":c  ]#n ]").unwrap();
        let mut record = Record::new();
        assert!(!lt.fits(&record)); // both names absent
        record.insert("c", Value::Text("abc".to_string()));
        record.insert("n", Value::Int(12));
        assert!(lt.fits(&record));
        record.insert("n", Value::Int(12345)); // wider than the 4-wide slot
        assert!(!lt.fits(&record));
    }

    #[test]
    fn test_blank_integer_counts_as_present_for_fitting() {
        let lt = LineTemplate::compile("#n ]").unwrap();
        let mut record = Record::new();
        record.insert("n", Value::Blank);
        assert!(lt.fits(&record));
    }

    #[test]
    fn test_render_any_prefers_first_candidate() {
        // Both layouts fit; the first in priority order wins even though
        // the second is wider.
        let template = Template::compile("#a ]\n#a   ]").unwrap();
        let mut record = Record::new();
        record.insert("a", Value::Int(5));
        assert_eq!(template.render_any(&record).unwrap(), "   5");
    }

    #[test]
    fn test_render_any_falls_through_to_wider_layout() {
        let template = Template::compile("#a ]\n#a   ]").unwrap();
        let mut record = Record::new();
        record.insert("a", Value::Int(12345));
        assert_eq!(template.render_any(&record).unwrap(), " 12345");
    }

    #[test]
    fn test_render_any_reports_when_nothing_fits() {
        let template = Template::compile("#a ]\n#a   ]").unwrap();
        let mut record = Record::new();
        record.insert("a", Value::Int(12345678));
        let err = template.render_any(&record).unwrap_err();
        assert_eq!(err, FormatError::NoFormatterFits { tried: 2 });
    }

    #[test]
    fn test_slots_expose_names_and_widths() {
        let lt = LineTemplate::compile("AB:code ]#amt  ").unwrap();
        assert_eq!(
            lt.format_spec().slots(),
            &[("code".to_string(), 7), ("amt".to_string(), 6)]
        );
    }
}
