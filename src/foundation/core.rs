use serde::{Deserialize, Serialize};

/// One unit of input: artifact source text plus the identifier it arrived under.
///
/// Immutable for the lifetime of a pipeline call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    source_text: String,
    identifier: String,
}

impl Artifact {
    /// Create an artifact from source text and an identifier.
    pub fn new(source_text: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            identifier: identifier.into(),
        }
    }

    /// Read an artifact from disk; the identifier is the file stem.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> crate::WrightResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::WrightError::project(format!("read artifact '{}': {e}", path.display()))
        })?;
        let ident = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("artifact")
            .to_owned();
        Ok(Self::new(text, ident))
    }

    /// Source text.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Identifier reduced to `[A-Za-z0-9-]`, suitable as a composition id.
    pub fn composition_id(&self) -> String {
        let mut out = String::with_capacity(self.identifier.len());
        for c in self.identifier.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c);
            } else if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
        }
        while out.ends_with('-') {
            out.pop();
        }
        if out.is_empty() {
            out.push_str("Artifact");
        }
        out
    }
}

/// Offset <-> 1-based line/column conversion for one source text.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Index the line starts of `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// 1-based `(line, column)` of a byte offset. Columns count bytes.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col as u32 + 1)
    }

    /// Byte offset of a 1-based `(line, column)`, clamped to the text.
    pub fn offset(&self, line: u32, column: u32) -> usize {
        let line = (line.max(1) as usize - 1).min(self.line_starts.len() - 1);
        let start = self.line_starts[line];
        (start + column.max(1) as usize - 1).min(self.len)
    }

    /// Byte offset of a 1-based `(line, column)` whose column counts UTF-16 code units, as
    /// TypeScript tooling reports it. `text` must be the indexed text. Clamped to the line.
    pub fn offset_utf16(&self, text: &str, line: u32, column: u32) -> usize {
        let line = (line.max(1) as usize - 1).min(self.line_starts.len() - 1);
        let start = self.line_starts[line];
        let mut units = column.max(1) as usize - 1;
        let mut at = start;
        for c in text.get(start..).unwrap_or("").chars() {
            if units == 0 || c == '\n' {
                break;
            }
            units = units.saturating_sub(c.len_utf16());
            at += c.len_utf8();
        }
        at
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
