//! Caller-supplied metadata threaded through processing for diagnostics.

/// Opaque source metadata attached to processing failures.
///
/// Carries no weight for matching itself; it only enriches the rendered
/// error report with where the offending line came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Source identifier, typically a file name.
    pub file: Option<String>,
    /// One-based line number within the source.
    pub line_num: Option<usize>,
    /// Free-form excerpt of surrounding lines, appended to reports.
    pub excerpt: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line_num(mut self, line_num: usize) -> Self {
        self.line_num = Some(line_num);
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let ctx = Context::new()
            .with_file("input.dat")
            .with_line_num(12)
            .with_excerpt("HDR...\nDTL...");
        assert_eq!(ctx.file.as_deref(), Some("input.dat"));
        assert_eq!(ctx.line_num, Some(12));
        assert!(ctx.excerpt.as_deref().unwrap().contains("DTL"));
    }

    #[test]
    fn test_default_is_empty() {
        let ctx = Context::default();
        assert!(ctx.file.is_none());
        assert!(ctx.line_num.is_none());
        assert!(ctx.excerpt.is_none());
    }
}
