use serde::{Deserialize, Serialize};

use crate::errors::{FsError, FsResult};

/// Zero-based line and character (column) in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A start/end position pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy)]
struct LineSpan {
    start_char: usize,
    start_byte: usize,
    // Excludes the line terminator
    end_byte: usize,
}

/// Line index over a text, converting character offsets to positions and back.
///
/// Lines end at `\n`; a `\r` directly before it is part of the terminator,
/// not of the line text.
#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
    lines: Vec<LineSpan>,
    char_len: usize,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut lines = Vec::new();
        let mut start_char = 0;
        let mut start_byte = 0;
        let mut char_len = 0;

        for (byte, ch) in text.char_indices() {
            char_len += 1;
            if ch == '\n' {
                let end_byte = if text[start_byte..byte].ends_with('\r') {
                    byte - 1
                } else {
                    byte
                };
                lines.push(LineSpan {
                    start_char,
                    start_byte,
                    end_byte,
                });
                start_char = char_len;
                start_byte = byte + 1;
            }
        }
        lines.push(LineSpan {
            start_char,
            start_byte,
            end_byte: text.len(),
        });

        Self {
            text,
            lines,
            char_len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Position of a character offset. Offsets past the end are an error.
    pub fn position_at(&self, offset: usize) -> FsResult<Position> {
        if offset > self.char_len {
            return Err(FsError::invariant_violation(format!(
                "offset {} is past the end of a {} character document",
                offset, self.char_len
            )));
        }
        let line = self.lines.partition_point(|l| l.start_char <= offset) - 1;
        Ok(Position::new(line, offset - self.lines[line].start_char))
    }

    /// Character offset of a position
    pub fn offset_at(&self, position: Position) -> FsResult<usize> {
        let span = self.lines.get(position.line).ok_or_else(|| {
            FsError::invariant_violation(format!("line {} does not exist", position.line))
        })?;
        let limit = self
            .lines
            .get(position.line + 1)
            .map_or(self.char_len, |next| next.start_char);
        let offset = span.start_char + position.character;
        if offset > limit {
            return Err(FsError::invariant_violation(format!(
                "character {} is past the end of line {}",
                position.character, position.line
            )));
        }
        Ok(offset)
    }

    /// Text of a line, without its terminator
    pub fn line_at(&self, line: usize) -> FsResult<&str> {
        let span = self
            .lines
            .get(line)
            .ok_or_else(|| FsError::invariant_violation(format!("line {} does not exist", line)))?;
        Ok(&self.text[span.start_byte..span.end_byte])
    }

    /// Text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> FsResult<&str> {
        if start > end {
            return Err(FsError::invariant_violation(format!(
                "range {}..{} is reversed",
                start, end
            )));
        }
        let start_byte = self.byte_offset(start)?;
        let end_byte = self.byte_offset(end)?;
        Ok(&self.text[start_byte..end_byte])
    }

    /// Text covered by a range
    pub fn text_in(&self, range: Range) -> FsResult<&str> {
        let start = self.offset_at(range.start)?;
        let end = self.offset_at(range.end)?;
        self.slice(start, end)
    }

    fn byte_offset(&self, offset: usize) -> FsResult<usize> {
        let position = self.position_at(offset)?;
        let span = self.lines[position.line];
        Ok(self.text[span.start_byte..]
            .char_indices()
            .nth(position.character)
            .map_or(self.text.len(), |(byte, _)| span.start_byte + byte))
    }
}
