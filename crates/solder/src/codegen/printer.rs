//! Indented append-only source writer.

/// One of the two output buffers of a generation pass.
///
/// Text only ever grows; indentation applies per line.
#[derive(Debug, Default, Clone)]
pub struct SourceWriter {
    buf: String,
    level: usize,
}

const INDENT: &str = "    ";

impl SourceWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase the indentation level.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease the indentation level.
    pub fn outdent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Append one line at the current indentation.
    pub fn line(&mut self, s: impl AsRef<str>) {
        let s = s.as_ref();
        if s.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Append preformatted text verbatim.
    pub fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the writer.
    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut w = SourceWriter::new();
        w.line("if (x) {");
        w.indent();
        w.line("return NULL;");
        w.outdent();
        w.line("}");

        assert_eq!(w.as_str(), "if (x) {\n    return NULL;\n}\n");
    }

    #[test]
    fn test_outdent_saturates() {
        let mut w = SourceWriter::new();
        w.outdent();
        w.line("x");
        assert_eq!(w.finish(), "x\n");
    }
}
