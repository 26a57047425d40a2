#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level record I/O for the JavaScript-like level definition file.
//!
//! The adapter turns the source text into [`LevelRecord`] values through a
//! lexer and a bracket-aware property scan, and writes rewritten grids back
//! by splicing new pattern bodies into the untouched original text. Loading,
//! transforming, and serializing are pure; [`LevelSource::write`] is the only
//! operation that touches storage.

mod lexer;
mod parser;

use std::{
    collections::HashSet,
    fs, io,
    ops::Range,
    path::{Path, PathBuf},
};

use cave_audit_core::{split_pattern_boundary, Grid, LevelRecord};
use log::{debug, info};
use thiserror::Error;

/// Failures raised while reading, parsing, or rewriting a level source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The level file could not be read or written.
    #[error("could not access level source at {}", .path.display())]
    Io {
        /// Path of the level file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A string, template, or comment never closed.
    #[error("unterminated {what} starting on line {line}")]
    Unterminated {
        /// Kind of construct left open.
        what: &'static str,
        /// One-based line of the opening delimiter.
        line: usize,
        /// Byte offset of the opening delimiter.
        offset: usize,
    },
    /// A bracket closed without a matching opener, or never closed.
    #[error("unbalanced '{delimiter}' on line {line}")]
    Unbalanced {
        /// Offending delimiter.
        delimiter: char,
        /// One-based line of the delimiter.
        line: usize,
        /// Byte offset of the delimiter.
        offset: usize,
    },
    /// A level object omitted a required key.
    #[error("level {level} is missing `{field}`")]
    MissingField {
        /// Name of the level.
        level: String,
        /// Missing key.
        field: &'static str,
    },
    /// A level key carried a value of the wrong shape.
    #[error("level {level} has an invalid `{field}` on line {line}")]
    InvalidField {
        /// Name of the level.
        level: String,
        /// Offending key.
        field: &'static str,
        /// One-based line of the value.
        line: usize,
    },
    /// Two levels share a name.
    #[error("level name {0} appears more than once")]
    DuplicateLevel(String),
    /// No level carries the requested name.
    #[error("no level named {0}")]
    UnknownLevel(String),
    /// A replacement grid does not match the original row shape.
    #[error("replacement grid for level {0} changes the row layout")]
    ShapeMismatch(String),
}

impl SourceError {
    pub(crate) fn unterminated(what: &'static str, source: &str, offset: usize) -> Self {
        Self::Unterminated {
            what,
            line: line_of(source, offset),
            offset,
        }
    }

    pub(crate) fn unbalanced(delimiter: char, source: &str, offset: usize) -> Self {
        Self::Unbalanced {
            delimiter,
            line: line_of(source, offset),
            offset,
        }
    }

    pub(crate) fn invalid_field(
        level: &str,
        field: &'static str,
        source: &str,
        offset: usize,
    ) -> Self {
        Self::InvalidField {
            level: level.to_owned(),
            field,
            line: line_of(source, offset),
        }
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

/// Parsed level file that can serialize itself back byte for byte.
#[derive(Clone, Debug)]
pub struct LevelSource {
    text: String,
    records: Vec<LevelRecord>,
    slots: Vec<PatternSlot>,
}

#[derive(Clone, Debug)]
struct PatternSlot {
    span: Range<usize>,
    replacement: Option<String>,
}

impl LevelSource {
    /// Reads and parses the level file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = Self::parse(text)?;
        debug!(
            "loaded {} level(s) from {}",
            parsed.records.len(),
            path.display()
        );
        Ok(parsed)
    }

    /// Parses level definitions from source text.
    pub fn parse(text: impl Into<String>) -> Result<Self, SourceError> {
        let text = text.into();
        let tokens = lexer::tokenize(&text)?;
        let parsed = parser::parse_levels(&text, &tokens)?;

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(parsed.len());
        let mut slots = Vec::with_capacity(parsed.len());
        for level in parsed {
            if !seen.insert(level.record.name().to_owned()) {
                return Err(SourceError::DuplicateLevel(level.record.name().to_owned()));
            }
            records.push(level.record);
            slots.push(PatternSlot {
                span: level.pattern_span,
                replacement: None,
            });
        }

        Ok(Self {
            text,
            records,
            slots,
        })
    }

    /// Level records in source order.
    #[must_use]
    pub fn records(&self) -> &[LevelRecord] {
        &self.records
    }

    /// Looks up a level by name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&LevelRecord> {
        self.records.iter().find(|record| record.name() == name)
    }

    /// Reports whether any pattern has been replaced.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.slots.iter().any(|slot| slot.replacement.is_some())
    }

    /// Replaces the grid of the named level.
    ///
    /// The new grid must keep every row length. The pattern's leading and
    /// trailing boundary text is carried over from the original, and rows are
    /// joined with the line ending the original body used.
    pub fn replace_grid(&mut self, name: &str, grid: Grid) -> Result<(), SourceError> {
        let index = self
            .records
            .iter()
            .position(|record| record.name() == name)
            .ok_or_else(|| SourceError::UnknownLevel(name.to_owned()))?;

        if self.records[index].grid().shape() != grid.shape() {
            return Err(SourceError::ShapeMismatch(name.to_owned()));
        }

        let slot = &mut self.slots[index];
        let (leading, body, trailing) = split_pattern_boundary(&self.text[slot.span.clone()]);
        let line_break = if body.contains("\r\n") { "\r\n" } else { "\n" };
        slot.replacement = Some(format!(
            "{leading}{}{trailing}",
            grid.render_with(line_break)
        ));
        self.records[index] = self.records[index].with_grid(grid);

        Ok(())
    }

    /// Renders the source with every replaced pattern spliced in.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut ordered: Vec<&PatternSlot> = self.slots.iter().collect();
        ordered.sort_by_key(|slot| slot.span.start);

        let mut output = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for slot in ordered {
            let Some(replacement) = &slot.replacement else {
                continue;
            };
            output.push_str(&self.text[cursor..slot.span.start]);
            output.push_str(replacement);
            cursor = slot.span.end;
        }
        output.push_str(&self.text[cursor..]);

        output
    }

    /// Writes the serialized source to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
        let path = path.as_ref();
        fs::write(path, self.serialize()).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("wrote level source to {}", path.display());
        Ok(())
    }
}
