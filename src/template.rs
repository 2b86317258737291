//! Template compilation: turning template text into reusable line schemas.
//!
//! Template format (one template line compiles to one [`LineTemplate`]):
//! ```text
//! HDR:name      ]#count ]?   <:flag>?  ]
//! ```
//!
//! - `:name` declares a text field; `#name` an integer field; `?` an ignored
//!   field. The marker's on-the-page length (sigil, name, trailing spaces,
//!   optional closing `]`) is the field's width. The bracket is stripped from
//!   the stored name but still counts one column.
//! - `<:name>` / `<#name>` are zero-width rename directives: they attach a
//!   name (and, for ignored fields, a kind) to the *next* field. The empty
//!   forms `<:>` / `<#>` attach nothing and only separate adjacent tokens.
//! - Everything else is literal text matched verbatim.
//!
//! Compilation happens once per template; matching and formatting reuse the
//! compiled artifacts for every data line.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CompileError;
use crate::field::{Field, FieldKind};
use crate::format::FormatSpec;

/// Field markers and rename directives within one template line. Any text
/// between matches is a literal run.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[#:]\w+\s*\]?|\?\s*\]?|<[#:]\w*>").expect("token pattern is valid")
});

/// Rename directives, stripped from template text shown in diagnostics.
static RENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[#:]\w*>").expect("rename pattern is valid"));

/// How a compiled line pattern treats lines shorter than the nominal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Every field must be present at its full width.
    Exact,
    /// The final field may be cut short by trailing-whitespace trimming.
    /// Lines cut in the middle of a non-final field still do not match.
    #[default]
    TrimTolerant,
}

/// One template line compiled for matching and formatting.
///
/// Holds the ordered field descriptors plus two derived artifacts: the
/// anchored matching pattern and the format descriptor. Immutable after
/// compilation and safe to share read-only across threads.
#[derive(Debug, Clone)]
pub struct LineTemplate {
    source: String,
    display: String,
    mode: MatchMode,
    fields: Vec<Field>,
    pattern: Regex,
    format: FormatSpec,
}

impl LineTemplate {
    /// Compile one template line under the default [`MatchMode`].
    pub fn compile(line: &str) -> Result<Self, CompileError> {
        Self::compile_with(line, MatchMode::default())
    }

    /// Compile one template line under an explicit [`MatchMode`].
    pub fn compile_with(line: &str, mode: MatchMode) -> Result<Self, CompileError> {
        let fields = compile_fields(line)?;
        let pattern = build_pattern(&fields, mode)?;
        let format = FormatSpec::from_fields(&fields);
        Ok(LineTemplate {
            source: line.to_string(),
            display: RENAME.replace_all(line, "").into_owned(),
            mode,
            fields,
            pattern,
            format,
        })
    }

    /// The template text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The template text with rename directives stripped, as shown in
    /// diagnostics.
    pub fn display_source(&self) -> &str {
        &self.display
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The ordered field descriptors of this line.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Sum of the field widths: the length of a canonical conforming line.
    pub fn nominal_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn format(&self) -> &FormatSpec {
        &self.format
    }
}

/// A compiled template group: one [`LineTemplate`] per template line.
///
/// Plays one of two roles per call, never both at once: an ordered multi-line
/// record layout (`process_lines`, `matches_lines`, `render`) or an ordered
/// priority list of mutually exclusive single-line layouts (`process_any`,
/// `render_any`).
#[derive(Debug, Clone, Default)]
pub struct Template {
    lines: Vec<LineTemplate>,
}

impl Template {
    /// Compile every line of `text` under the default [`MatchMode`].
    pub fn compile(text: &str) -> Result<Self, CompileError> {
        Self::compile_with(text, MatchMode::default())
    }

    /// Compile every line of `text` under an explicit [`MatchMode`].
    pub fn compile_with(text: &str, mode: MatchMode) -> Result<Self, CompileError> {
        let lines = text
            .lines()
            .map(|line| LineTemplate::compile_with(line, mode))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Template { lines })
    }

    /// Assemble a group from already-compiled line templates.
    pub fn from_lines(lines: Vec<LineTemplate>) -> Self {
        Template { lines }
    }

    pub fn lines(&self) -> &[LineTemplate] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reject malformed rename directives before tokenizing. A well-formed
/// directive is `<` + sigil + word characters + `>`; a bare `<` not followed
/// by a sigil is ordinary literal text.
fn check_directives(line: &str) -> Result<(), CompileError> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '<' && matches!(chars.get(i + 1), Some(':') | Some('#')) {
            let mut j = i + 2;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            match chars.get(j) {
                Some('>') => i = j + 1,
                Some(&found) => {
                    return Err(CompileError::UnknownMarker {
                        template: line.to_string(),
                        found,
                        column: j,
                    });
                }
                None => {
                    return Err(CompileError::UnterminatedDirective {
                        template: line.to_string(),
                        column: i,
                    });
                }
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Tokenize one template line and fold it into field descriptors, threading
/// the pending rename pair left to right.
fn compile_fields(line: &str) -> Result<Vec<Field>, CompileError> {
    check_directives(line)?;
    let mut fields = Vec::new();
    let mut pending: Option<(String, FieldKind)> = None;
    let mut last = 0;
    for m in TOKEN.find_iter(line) {
        if m.start() > last {
            push_literal(&mut fields, &mut pending, &line[last..m.start()]);
        }
        let tok = m.as_str();
        if let Some(body) = tok.strip_prefix('<') {
            // Zero-width directive: set (or clear) the pending rename pair.
            let name = &body[1..body.len() - 1];
            if name.is_empty() {
                pending = None;
            } else {
                let kind = if tok.starts_with("<#") {
                    FieldKind::Integer
                } else {
                    FieldKind::Text
                };
                pending = Some((name.to_string(), kind));
            }
        } else {
            push_marker(&mut fields, &mut pending, tok);
        }
        last = m.end();
    }
    if last < line.len() {
        push_literal(&mut fields, &mut pending, &line[last..]);
    }
    Ok(fields)
}

fn apply_pending(field: &mut Field, pending: &mut Option<(String, FieldKind)>) {
    if let Some((name, kind)) = pending.take() {
        field.name = Some(name);
        if field.kind == FieldKind::Ignored {
            field.kind = kind;
        }
    }
}

fn push_literal(fields: &mut Vec<Field>, pending: &mut Option<(String, FieldKind)>, part: &str) {
    let mut field = Field::literal(part);
    apply_pending(&mut field, pending);
    fields.push(field);
}

fn push_marker(fields: &mut Vec<Field>, pending: &mut Option<(String, FieldKind)>, part: &str) {
    let width = part.chars().count();
    // A closing bracket is stripped from the stored name but still counts
    // one column of width.
    let body = part.strip_suffix(']').unwrap_or(part);
    let mut field = match part.chars().next() {
        Some(':') => Field {
            kind: FieldKind::Text,
            width,
            name: Some(marker_name(body)),
            literal: None,
        },
        Some('#') => Field {
            kind: FieldKind::Integer,
            width,
            name: Some(marker_name(body)),
            literal: None,
        },
        _ => Field {
            kind: FieldKind::Ignored,
            width,
            name: None,
            literal: None,
        },
    };
    apply_pending(&mut field, pending);
    fields.push(field);
}

fn marker_name(body: &str) -> String {
    body.trim().chars().skip(1).collect()
}

/// Concatenate per-field pattern pieces into the anchored matching regex.
fn build_pattern(fields: &[Field], mode: MatchMode) -> Result<Regex, CompileError> {
    let mut pat = String::from(r"(?s)\A");
    for (i, field) in fields.iter().enumerate() {
        let full = full_piece(field);
        let is_final = i + 1 == fields.len();
        if mode == MatchMode::TrimTolerant && is_final && field.width > 0 {
            let _ = write!(pat, "(?:{}|{})", full, short_piece(field));
        } else {
            pat.push_str(&full);
        }
    }
    Ok(Regex::new(&pat)?)
}

fn full_piece(field: &Field) -> String {
    match field.kind {
        FieldKind::Literal => regex::escape(field.literal.as_deref().unwrap_or_default()),
        FieldKind::Integer => format!("[ 0-9]{{{}}}", field.width),
        FieldKind::Text | FieldKind::Ignored => format!(".{{{}}}", field.width),
    }
}

/// The short form a final field may take: fewer than `width` characters
/// reaching true end of input. Interior fields never get this alternative,
/// which is what keeps lines cut mid-field from matching.
fn short_piece(field: &Field) -> String {
    match field.kind {
        FieldKind::Integer => format!(r"[ 0-9]{{0,{}}}\z", field.width - 1),
        FieldKind::Text | FieldKind::Ignored => format!(r".{{0,{}}}\z", field.width - 1),
        FieldKind::Literal => {
            let text = field.literal.as_deref().unwrap_or_default();
            format!(r"{}\z", literal_prefixes(text))
        }
    }
}

/// A pattern matching every proper prefix of `text` (including the empty
/// one), built as a chain of nested optional groups.
fn literal_prefixes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let proper = &chars[..chars.len().saturating_sub(1)];
    let mut out = String::new();
    for c in proper {
        out.push_str("(?:");
        out.push_str(&regex::escape(&c.to_string()));
    }
    for _ in proper {
        out.push_str(")?");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_marker_widths() {
        let lt = LineTemplate::compile("AB:code ]#amt  ").unwrap();
        let fields = lt.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].kind, FieldKind::Literal);
        assert_eq!(fields[0].width, 2);
        assert_eq!(fields[0].literal.as_deref(), Some("AB"));
        assert_eq!(fields[1].kind, FieldKind::Text);
        assert_eq!(fields[1].width, 7);
        assert_eq!(fields[1].name.as_deref(), Some("code"));
        assert_eq!(fields[2].kind, FieldKind::Integer);
        assert_eq!(fields[2].width, 6);
        assert_eq!(fields[2].name.as_deref(), Some("amt"));
    }

    #[test]
    fn test_width_invariant() {
        // No zero-width directives: field widths must sum to the template
        // line's literal character length.
        for line in ["AB:code ]#amt  ", "?   :name  #n ]tail", "just a literal"] {
            let lt = LineTemplate::compile(line).unwrap();
            assert_eq!(lt.nominal_width(), line.chars().count(), "line {:?}", line);
        }
    }

    #[test]
    fn test_bracket_stripped_from_name_but_counted() {
        let lt = LineTemplate::compile(":name]").unwrap();
        let f = &lt.fields()[0];
        assert_eq!(f.name.as_deref(), Some("name"));
        assert_eq!(f.width, 6);
    }

    #[test]
    fn test_trailing_spaces_belong_to_marker() {
        let lt = LineTemplate::compile("#n   X").unwrap();
        let fields = lt.fields();
        assert_eq!(fields[0].width, 5);
        assert_eq!(fields[0].name.as_deref(), Some("n"));
        assert_eq!(fields[1].kind, FieldKind::Literal);
        assert_eq!(fields[1].literal.as_deref(), Some("X"));
    }

    #[test]
    fn test_ignored_marker() {
        let lt = LineTemplate::compile("?  ]").unwrap();
        let f = &lt.fields()[0];
        assert_eq!(f.kind, FieldKind::Ignored);
        assert_eq!(f.width, 4);
        assert!(f.name.is_none());
    }

    #[test]
    fn test_rename_converts_ignored_field() {
        let lt = LineTemplate::compile("<:flag>?  ").unwrap();
        let fields = lt.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].kind, FieldKind::Text);
        assert_eq!(fields[0].width, 3);
        assert_eq!(fields[0].name.as_deref(), Some("flag"));
    }

    #[test]
    fn test_rename_integer_directive() {
        let lt = LineTemplate::compile("<#total>?    ").unwrap();
        let f = &lt.fields()[0];
        assert_eq!(f.kind, FieldKind::Integer);
        assert_eq!(f.name.as_deref(), Some("total"));
        assert_eq!(f.width, 5);
    }

    #[test]
    fn test_rename_names_a_literal_without_changing_kind() {
        let lt = LineTemplate::compile("<:tag>HDR").unwrap();
        let f = &lt.fields()[0];
        assert_eq!(f.kind, FieldKind::Literal);
        assert_eq!(f.name.as_deref(), Some("tag"));
        assert_eq!(f.literal.as_deref(), Some("HDR"));
    }

    #[test]
    fn test_empty_directive_is_a_separator() {
        // Without <:> the text field would swallow "cd" into its name.
        let lt = LineTemplate::compile(":ab<:>cd").unwrap();
        let fields = lt.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].kind, FieldKind::Text);
        assert_eq!(fields[0].name.as_deref(), Some("ab"));
        assert_eq!(fields[0].width, 3);
        assert_eq!(fields[1].kind, FieldKind::Literal);
        assert_eq!(fields[1].literal.as_deref(), Some("cd"));
    }

    #[test]
    fn test_empty_directive_clears_nothing_pending() {
        let lt = LineTemplate::compile("<:>?  ").unwrap();
        let f = &lt.fields()[0];
        assert_eq!(f.kind, FieldKind::Ignored);
        assert!(f.name.is_none());
    }

    #[test]
    fn test_unterminated_directive_fails_compile() {
        let err = LineTemplate::compile("AB<:flag").unwrap_err();
        match err {
            CompileError::UnterminatedDirective { column, .. } => assert_eq!(column, 2),
            other => panic!("expected UnterminatedDirective, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_marker_character_fails_compile() {
        let err = LineTemplate::compile("<#amt!>").unwrap_err();
        match err {
            CompileError::UnknownMarker { found, column, .. } => {
                assert_eq!(found, '!');
                assert_eq!(column, 5);
            }
            other => panic!("expected UnknownMarker, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_angle_bracket_is_literal() {
        let lt = LineTemplate::compile("a<b>c").unwrap();
        assert_eq!(lt.fields().len(), 1);
        assert_eq!(lt.fields()[0].literal.as_deref(), Some("a<b>c"));
    }

    #[test]
    fn test_display_source_strips_rename_markers() {
        let lt = LineTemplate::compile("HDR<:flag>?  #n ]").unwrap();
        assert_eq!(lt.display_source(), "HDR?  #n ]");
        assert_eq!(lt.source(), "HDR<:flag>?  #n ]");
    }

    #[test]
    fn test_group_compiles_one_schema_per_line() {
        let t = Template::compile("HDR:name ]\nDTL#qty  ]").unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.lines()[0].fields()[0].literal.as_deref(), Some("HDR"));
        assert_eq!(t.lines()[1].fields()[0].literal.as_deref(), Some("DTL"));
    }

    #[test]
    fn test_compile_error_surfaces_from_group() {
        assert!(Template::compile("ok line\nbad <#x").is_err());
    }

    #[test]
    fn test_mode_is_recorded() {
        let exact = LineTemplate::compile_with(":a ]", MatchMode::Exact).unwrap();
        assert_eq!(exact.mode(), MatchMode::Exact);
        let tolerant = LineTemplate::compile(":a ]").unwrap();
        assert_eq!(tolerant.mode(), MatchMode::TrimTolerant);
    }
}
