//! Diagnostic module - Structured compiler errors.
//!
//! Every fatal condition the inference core can hit is an [`ErrorKind`];
//! an [`Error`] pins a kind to a primary [`Location`] and carries an
//! ordered chain of secondary `(location, note)` pairs appended with
//! [`Error::add_info`]. The core never recovers locally: errors propagate
//! with `?` to the driver, which prints them and sets the exit status.
//!
//! Rendering follows the `path:line:col: error: msg` convention with
//! indented note lines:
//!
//! ```text
//! main.tn:4:11: error: type error. Int != Bool
//!   main.tn:4:3: note: while checking that both branches of a conditional must match
//! ```
//!
//! The `error:` / `note:` tags are colored via the `colored` crate, which
//! strips color automatically when the stream is not a TTY.

use std::fmt;

use colored::Colorize;
use thiserror::Error as ThisError;

use crate::location::Location;
use crate::symbol::Symbol;

/// Result alias used across the compiler core.
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of fatal errors the inference core reports.
///
/// `UnresolvedInstance` is raised by the downstream type-class resolver,
/// not by inference itself, but the shape is modeled here so every phase
/// shares one error currency.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ErrorKind {
    #[error("unbound variable `{0}`")]
    UnboundVariable(Symbol),

    #[error("type error. {expected} != {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("infinite type detected! {name} = {ty}")]
    InfiniteType { name: Symbol, ty: String },

    #[error("cannot unify shapes of differing arity ({expected} vs. {actual})")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("duplicate binding for `{0}`")]
    DuplicateBinding(Symbol),

    #[error("maximum type recursion depth exceeded")]
    MaximumRecursion,

    #[error("there are statements after a return statement")]
    UnreachableCode,

    #[error("no instance of `{class}` found for {ty}")]
    UnresolvedInstance { class: Symbol, ty: String },

    #[error("{0}")]
    Internal(String),
}

/// A fatal, located compiler error with chained context notes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Location,
    /// Secondary notes in the order they were attached, outermost last.
    pub notes: Vec<(Location, String)>,
}

impl Error {
    pub fn new(location: Location, kind: ErrorKind) -> Self {
        Self {
            kind,
            location,
            notes: Vec::new(),
        }
    }

    /// Attach a secondary note. Later calls append; display order matches
    /// attachment order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ternc_util::{Error, ErrorKind, Location, Symbol};
    ///
    /// let err = Error::new(
    ///     Location::new("main.tn", 1, 5),
    ///     ErrorKind::UnboundVariable(Symbol::intern("x")),
    /// )
    /// .add_info(Location::new("main.tn", 1, 1), "while checking that `f x` is well-typed");
    /// assert_eq!(err.notes.len(), 1);
    /// ```
    pub fn add_info(mut self, location: Location, info: impl Into<String>) -> Self {
        self.notes.push((location, info.into()));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.location, "error:".red().bold(), self.kind)?;
        for (loc, info) in &self.notes {
            write!(f, "\n  {}: {} {}", loc, "note:".cyan().bold(), info)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, col: u32) -> Location {
        Location::new("test.tn", line, col)
    }

    #[test]
    fn test_kind_messages() {
        assert_eq!(
            ErrorKind::UnboundVariable(Symbol::intern("foo")).to_string(),
            "unbound variable `foo`"
        );
        assert_eq!(
            ErrorKind::TypeMismatch {
                expected: "Int".into(),
                actual: "Bool".into()
            }
            .to_string(),
            "type error. Int != Bool"
        );
        assert_eq!(
            ErrorKind::ArityMismatch {
                expected: 2,
                actual: 3
            }
            .to_string(),
            "cannot unify shapes of differing arity (2 vs. 3)"
        );
        assert_eq!(
            ErrorKind::MaximumRecursion.to_string(),
            "maximum type recursion depth exceeded"
        );
    }

    #[test]
    fn test_display_primary_line() {
        colored::control::set_override(false);
        let err = Error::new(loc(4, 11), ErrorKind::Internal("boom".into()));
        assert_eq!(err.to_string(), "test.tn:4:11: error: boom");
    }

    #[test]
    fn test_display_with_notes() {
        colored::control::set_override(false);
        let err = Error::new(
            loc(4, 11),
            ErrorKind::TypeMismatch {
                expected: "Int".into(),
                actual: "Bool".into(),
            },
        )
        .add_info(loc(4, 3), "while checking that both branches of a conditional must match")
        .add_info(loc(1, 1), "while checking that `main` is well-typed");

        let rendered = err.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "test.tn:4:11: error: type error. Int != Bool");
        assert_eq!(
            lines[1],
            "  test.tn:4:3: note: while checking that both branches of a conditional must match"
        );
        assert_eq!(lines[2], "  test.tn:1:1: note: while checking that `main` is well-typed");
    }

    #[test]
    fn test_notes_preserve_order() {
        let err = Error::new(loc(1, 1), ErrorKind::MaximumRecursion)
            .add_info(loc(2, 2), "first")
            .add_info(loc(3, 3), "second");
        assert_eq!(err.notes[0].1, "first");
        assert_eq!(err.notes[1].1, "second");
    }
}
