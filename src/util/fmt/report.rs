use std::{fmt, io::Write};

use crate::{
    parser, semantic,
    token::{Span, Spanned},
    util::fmt::{Context, Show},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

/// Errors which may be reported to the user.
pub trait Diagnostic {
    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Another location the diagnostic refers to, rendered as a note.
    fn related_span(&self) -> Option<Span> {
        None
    }
}

impl Diagnostic for parser::Error {}

impl Diagnostic for semantic::Error {
    fn severity(&self) -> Severity {
        semantic::Error::severity(self)
    }

    fn related_span(&self) -> Option<Span> {
        semantic::Error::related_span(self)
    }
}

/// Renders diagnostics against a source file:
///
/// ```text
/// main.clf:2:11: error: type mismatch: expected int, but got string
///   int a = "s";
///           ^~~
/// ```
pub struct Reporter<'src> {
    file_name: &'src str,
    src: &'src str,
}

impl<'src> Reporter<'src> {
    pub fn new(file_name: &'src str, src: &'src str) -> Reporter<'src> {
        Reporter { file_name, src }
    }

    pub fn emit<E>(
        &self,
        w: &mut impl Write,
        ctx: &Context<'_>,
        error: &Spanned<E>,
    ) -> std::io::Result<()>
    where
        E: Diagnostic,
        Spanned<E>: Show,
    {
        let severity = error.inner.severity();
        self.render(w, severity, error.span, &error.display(ctx))?;
        if let Some(related) = error.inner.related_span() {
            self.render(w, Severity::Note, related, &"previous definition is here")?;
        }
        Ok(())
    }

    pub fn render(
        &self,
        w: &mut impl Write,
        severity: Severity,
        span: Span,
        message: &dyn fmt::Display,
    ) -> std::io::Result<()> {
        let (line, col) = line_col(self.src, span.lo);
        writeln!(w, "{}:{line}:{col}: {severity}: {message}", self.file_name)?;

        let text = line_text(self.src, span.lo);
        writeln!(w, "{text}")?;

        // Tabs are kept so the caret lines up with the source line.
        let pad: String = text
            .chars()
            .take(col - 1)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let rest_of_line = text.chars().count().saturating_sub(col - 1);
        let width = span_text(self.src, span)
            .lines()
            .next()
            .map_or(0, |s| s.chars().count())
            .min(rest_of_line)
            .max(1);
        writeln!(w, "{pad}^{}", "~".repeat(width - 1))
    }
}

/// Returns the 1-based line and column (in chars) of the byte `offset`.
pub fn line_col(src: &str, offset: u32) -> (usize, usize) {
    let before = &src[..clamp(src, offset)];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

/// Returns the full line containing the byte `offset`, without the line break.
fn line_text(src: &str, offset: u32) -> &str {
    let offset = clamp(src, offset);
    let start = src[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = src[offset..].find('\n').map_or(src.len(), |i| offset + i);
    src[start..end].trim_end_matches('\r')
}

fn span_text(src: &str, span: Span) -> &str {
    let lo = clamp(src, span.lo);
    let hi = clamp(src, span.hi());
    &src[lo..hi]
}

fn clamp(src: &str, offset: u32) -> usize {
    (offset as usize).min(src.len())
}
