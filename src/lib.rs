//! # fixedform
//!
//! A fixed-width text record template engine.
//!
//! This library compiles a small textual template language describing the
//! exact column layout of one or more lines into a reusable schema, then
//! uses that schema in both directions: parsing raw fixed-width lines into a
//! structured [`Record`], and rendering a record back into lines byte-for-
//! byte compatible with the original layout. It targets formats where field
//! boundaries are defined by column position rather than delimiters, such as
//! legacy mainframe extracts or EDI-style fixed-column files.
//!
//! ## Overview
//!
//! A template line places fields on the column grid by example:
//! - `:name` declares a text field, `#name` an integer field, `?` an ignored
//!   field; the marker's on-the-page length is the field's width.
//! - `<:name>` / `<#name>` rename the next field without taking a column.
//! - Everything else is literal text matched verbatim.
//!
//! Compilation happens once per template; matching and formatting reuse the
//! compiled schema for every data line and allocate only call-local data,
//! so a compiled [`Template`] can be shared read-only across threads.
//!
//! ## Example
//!
//! ```
//! use fixedform::{Context, Template};
//!
//! // Layout: literal "AB", 7-wide text field, 6-wide integer field.
//! let template = Template::compile("AB:code ]#amt  ")?;
//!
//! let record = template.process_any("ABfoo        42", &Context::default())?;
//! assert_eq!(record.text("code"), Some("foo"));
//! assert_eq!(record.int("amt"), Some(42));
//!
//! // Rendering is the inverse of parsing for canonical padded lines.
//! assert_eq!(template.render_any(&record)?, "ABfoo        42");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod error;
pub mod field;
pub mod format;
pub mod matcher;
pub mod record;
pub mod template;

pub use context::Context;
pub use error::{CompileError, FormatError, MatchError, ProcessError, ProcessErrorKind};
pub use field::{Field, FieldKind};
pub use format::FormatSpec;
pub use record::{Record, Value};
pub use template::{LineTemplate, MatchMode, Template};
