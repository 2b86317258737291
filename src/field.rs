//! Field descriptors: compiled metadata for one fixed-width slot in a line.

/// The kind of content a field slot holds.
///
/// Templates compile to a closed set of kinds; both the matcher and the
/// formatter dispatch on this enum rather than inspecting the template text
/// again at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Exact text that must appear verbatim in the line.
    Literal,
    /// Free text, trimmed on extraction, left-justified on rendering.
    Text,
    /// Digits or blanks, parsed as an integer, right-justified on rendering.
    Integer,
    /// Positions that are skipped on extraction and rendered as spaces.
    Ignored,
}

impl FieldKind {
    /// Display name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Literal => "literal",
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Ignored => "ignored",
        }
    }
}

/// One fixed-width slot within a compiled line template.
///
/// Created during template compilation and immutable afterwards. The sum of
/// `width` over a line template's fields equals the nominal line length.
/// Widths are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    /// Number of character positions this slot occupies.
    pub width: usize,
    /// Symbolic name, required for `Text`/`Integer` fields produced by the
    /// compiler; `Literal`/`Ignored` fields only carry one when a rename
    /// directive assigned it.
    pub name: Option<String>,
    /// Expected text, present only for `Literal` fields.
    pub literal: Option<String>,
}

impl Field {
    /// A literal field matching `text` verbatim.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let width = text.chars().count();
        Field {
            kind: FieldKind::Literal,
            width,
            name: None,
            literal: Some(text),
        }
    }

    /// A named text field of the given width.
    pub fn text(name: impl Into<String>, width: usize) -> Self {
        Field {
            kind: FieldKind::Text,
            width,
            name: Some(name.into()),
            literal: None,
        }
    }

    /// A named integer field of the given width.
    pub fn integer(name: impl Into<String>, width: usize) -> Self {
        Field {
            kind: FieldKind::Integer,
            width,
            name: Some(name.into()),
            literal: None,
        }
    }

    /// An unnamed ignored field of the given width.
    pub fn ignored(width: usize) -> Self {
        Field {
            kind: FieldKind::Ignored,
            width,
            name: None,
            literal: None,
        }
    }
}
