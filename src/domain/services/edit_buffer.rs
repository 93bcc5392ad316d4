//! Edit buffer over immutable text
//!
//! Records `(range, replacement)` pairs against the original offsets and
//! materializes the result in one pass, so no edit ever sees offsets shifted
//! by another. The same walk produces a position map from the rewritten
//! text back to the original.

use std::fmt;

use thiserror::Error;

use super::source_map::{Mappings, OriginalPosition, Segment, SourceMap};
use crate::domain::entities::ByteRange;

/// Invalid edit request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("range {start}..{end} is outside the {len}-byte content")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("range {start}..{end} splits a character")]
    NotCharBoundary { start: usize, end: usize },

    #[error("range {start}..{end} overlaps the edit at {other_start}..{other_end}")]
    Overlap {
        start: usize,
        end: usize,
        other_start: usize,
        other_end: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: ByteRange,
    replacement: String,
}

/// Pending edits against one original text
#[derive(Debug, Clone)]
pub struct EditBuffer<'a> {
    original: &'a str,
    /// Sorted by start offset, never overlapping
    edits: Vec<Edit>,
}

impl<'a> EditBuffer<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            edits: Vec::new(),
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Replace `range` of the original text
    pub fn overwrite(
        &mut self,
        range: ByteRange,
        replacement: impl Into<String>,
    ) -> Result<(), EditError> {
        let (start, end) = (range.start, range.end);
        if start > end || end > self.original.len() {
            return Err(EditError::OutOfBounds {
                start,
                end,
                len: self.original.len(),
            });
        }
        if !self.original.is_char_boundary(start) || !self.original.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { start, end });
        }

        let at = self.edits.partition_point(|e| e.range.start < start);
        let neighbours = at.checked_sub(1).into_iter().chain(Some(at));
        for i in neighbours {
            if let Some(other) = self.edits.get(i) {
                if other.range.overlaps(&range) {
                    return Err(EditError::Overlap {
                        start,
                        end,
                        other_start: other.range.start,
                        other_end: other.range.end,
                    });
                }
            }
        }

        self.edits.insert(
            at,
            Edit {
                range,
                replacement: replacement.into(),
            },
        );
        Ok(())
    }

    /// Position map from the rewritten text back to the original
    ///
    /// Segments are placed at line starts, at every edit, and at word
    /// boundaries inside unchanged text. Columns count UTF-16 code units.
    pub fn generate_map(&self, file: &str, source: &str) -> SourceMap {
        let mut walk = MapWalk::new();
        let mut cursor = 0;

        for edit in &self.edits {
            walk.unchanged(&self.original[cursor..edit.range.start]);
            walk.replaced(&edit.replacement, &self.original[edit.range.start..edit.range.end]);
            cursor = edit.range.end;
        }
        walk.unchanged(&self.original[cursor..]);

        SourceMap::from_mappings(
            Some(file.to_string()),
            vec![Some(source.to_string())],
            Vec::new(),
            &walk.lines,
        )
    }
}

impl fmt::Display for EditBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cursor = 0;
        for edit in &self.edits {
            f.write_str(&self.original[cursor..edit.range.start])?;
            f.write_str(&edit.replacement)?;
            cursor = edit.range.end;
        }
        f.write_str(&self.original[cursor..])
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tracks generated and original positions while walking the text
struct MapWalk {
    lines: Mappings,
    generated: (u32, u32),
    original: (u32, u32),
    /// Next unchanged character starts a new chunk
    chunk_start: bool,
    previous: Option<char>,
}

impl MapWalk {
    fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
            generated: (0, 0),
            original: (0, 0),
            chunk_start: true,
            previous: None,
        }
    }

    fn mark(&mut self) {
        let column = self.generated.1;
        let Some(line) = self.lines.last_mut() else {
            return;
        };
        if line.last().is_some_and(|s| s.generated_column == column) {
            return;
        }
        line.push(Segment {
            generated_column: column,
            original: Some(OriginalPosition {
                source: 0,
                line: self.original.0,
                column: self.original.1,
                name: None,
            }),
        });
    }

    fn advance_generated(&mut self, c: char) {
        if c == '\n' {
            self.generated = (self.generated.0 + 1, 0);
            self.lines.push(Vec::new());
        } else {
            self.generated.1 += c.len_utf16() as u32;
        }
    }

    fn advance_original(&mut self, c: char) {
        if c == '\n' {
            self.original = (self.original.0 + 1, 0);
        } else {
            self.original.1 += c.len_utf16() as u32;
        }
    }

    fn unchanged(&mut self, text: &str) {
        for c in text.chars() {
            let boundary = match self.previous {
                None => true,
                Some(p) => p.is_whitespace() || is_word(p) != is_word(c) || !is_word(c),
            };
            if !c.is_whitespace() && (self.chunk_start || self.generated.1 == 0 || boundary) {
                self.mark();
            }
            self.chunk_start = false;
            self.previous = Some(c);
            self.advance_generated(c);
            self.advance_original(c);
        }
    }

    fn replaced(&mut self, replacement: &str, original: &str) {
        self.mark();
        for c in replacement.chars() {
            self.advance_generated(c);
        }
        for c in original.chars() {
            self.advance_original(c);
        }
        self.chunk_start = true;
        self.previous = None;
    }
}
