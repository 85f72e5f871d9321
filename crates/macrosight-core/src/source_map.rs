//! Mapping from locations to files, lines, and columns
//!
//! The source map owns the translation unit's offset space: every file seen
//! by the host front end occupies a contiguous range of offsets, in inclusion
//! order. Macro-internal locations live above file space and carry a link to
//! the location they were spelled at; resolving one walks the links until a
//! file-level location is reached.

use crate::location::{LineCol, SourceLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Categorical failures when stringifying a source location
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    #[error("Invalid SLoc")]
    InvalidLoc,

    #[error("Invalid file ID")]
    InvalidFileId,

    #[error("File without FileEntry")]
    NoFileEntry,

    #[error("Nameless file")]
    NamelessFile,

    #[error("Invalid File SLoc")]
    InvalidFileLoc,
}

/// On-disk identity of a source file.
///
/// Built-in and scratch buffers have no entry at all; an entry with an empty
/// `real_path` is a file whose path could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub real_path: String,
}

/// One file in the translation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Display name as the host reported it
    pub name: String,
    /// On-disk identity, if any
    pub entry: Option<FileEntry>,
    /// First offset of this file in the translation-unit offset space
    pub start: u32,
    /// Number of offsets this file occupies
    pub len: u32,
    /// Start of each line, relative to `start`; always begins with 0
    pub line_starts: Vec<u32>,
}

/// The translation unit's file table and macro-spelling links
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    /// Macro-internal location -> the location it was spelled at
    macro_spellings: HashMap<u32, u32>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file of `len` offsets after the files already present.
    /// Returns the file's starting location. Offset 0 stays reserved as the
    /// invalid location.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        real_path: Option<String>,
        len: u32,
        line_starts: Vec<u32>,
    ) -> SourceLocation {
        let start = self
            .files
            .last()
            .map(|f| f.start + f.len)
            .unwrap_or(1);
        let line_starts = if line_starts.is_empty() {
            vec![0]
        } else {
            line_starts
        };
        self.files.push(SourceFile {
            name: name.into(),
            entry: real_path.map(|real_path| FileEntry { real_path }),
            start,
            len,
            line_starts,
        });
        SourceLocation(start)
    }

    /// Record that macro-internal location `loc` was spelled at `spelling`
    pub fn add_macro_spelling(&mut self, loc: SourceLocation, spelling: SourceLocation) {
        if loc.is_valid() {
            self.macro_spellings.insert(loc.0, spelling.0);
        }
    }

    /// End of file space; anything at or past this is macro-internal
    fn file_space_end(&self) -> u32 {
        self.files.last().map(|f| f.start + f.len).unwrap_or(1)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Resolve a location to file level by chasing spelling links.
    ///
    /// Returns the invalid location when the chain cannot be resolved. The
    /// walk is bounded by the number of links so a cyclic dump cannot hang
    /// the analysis.
    pub fn file_loc(&self, loc: SourceLocation) -> SourceLocation {
        if loc.is_invalid() {
            return SourceLocation::INVALID;
        }
        let mut cur = loc.0;
        let mut steps = 0usize;
        while cur >= self.file_space_end() {
            match self.macro_spellings.get(&cur) {
                Some(&next) if next != 0 && steps <= self.macro_spellings.len() => {
                    cur = next;
                    steps += 1;
                }
                _ => return SourceLocation::INVALID,
            }
        }
        SourceLocation(cur)
    }

    /// Index of the file containing the given file-level location
    pub fn file_index(&self, loc: SourceLocation) -> Option<usize> {
        if loc.is_invalid() || loc.0 >= self.file_space_end() {
            return None;
        }
        match self.files.binary_search_by_key(&loc.0, |f| f.start) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => {
                let f = &self.files[i - 1];
                (loc.0 < f.start + f.len).then_some(i - 1)
            }
        }
    }

    /// Compare two locations by translation-unit order.
    ///
    /// Both are resolved to file level first; an unresolvable location
    /// compares as not-before everything.
    pub fn is_before_in_tu(&self, a: SourceLocation, b: SourceLocation) -> bool {
        let (fa, fb) = (self.file_loc(a), self.file_loc(b));
        fa.is_valid() && fb.is_valid() && fa.0 < fb.0
    }

    /// Line and column of a file-level location
    pub fn line_col(&self, loc: SourceLocation) -> Option<LineCol> {
        let idx = self.file_index(loc)?;
        let f = &self.files[idx];
        let rel = loc.0 - f.start;
        let line = match f.line_starts.binary_search(&rel) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Some(LineCol {
            line: line as u32 + 1,
            col: rel - f.line_starts[line] + 1,
        })
    }

    /// Full `<realpath>:<line>:<col>` for a location, or the categorical
    /// error describing why it cannot be produced.
    pub fn try_full_source_loc(&self, loc: SourceLocation) -> Result<String, LocationError> {
        if loc.is_invalid() {
            return Err(LocationError::InvalidLoc);
        }
        let floc = self.file_loc(loc);
        let idx = self
            .file_index(floc)
            .ok_or(LocationError::InvalidFileId)?;
        let file = &self.files[idx];
        let entry = file.entry.as_ref().ok_or(LocationError::NoFileEntry)?;
        if entry.real_path.is_empty() {
            return Err(LocationError::NamelessFile);
        }
        let lc = self.line_col(floc).ok_or(LocationError::InvalidFileLoc)?;
        Ok(format!("{}:{}", entry.real_path, lc))
    }
}
