//! Macrosight Core
//!
//! Core types and interfaces for the Macrosight macro analysis engine.

pub mod config;
pub mod error;
pub mod location;
pub mod source_map;
pub mod token;

pub use error::{Error, Result};
pub use location::{LineCol, SourceLocation, SourceRange};
pub use source_map::{FileEntry, LocationError, SourceFile, SourceMap};
pub use token::{Token, TokenKind};
