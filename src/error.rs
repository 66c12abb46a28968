/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The error taxonomy shared by every fallible operation in this crate.
//!
//! There are three kinds of errors: an index or block argument outside its
//! declared domain ([`Error::OutOfRange`]), a constructor argument that is
//! internally inconsistent ([`Error::BadArgument`]), and a write attempted
//! on a read-only view ([`Error::Unsupported`]). A fourth, logical
//! "unbalanced parentheses" condition is deliberately *not* represented
//! here: per the contract of [`crate::balanced_parens`], feeding an
//! unbalanced sequence to the range min/max tree is undefined behavior,
//! not a checked error.

use thiserror::Error as ThisError;

/// The error type returned by every fallible operation in this crate.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An index (or block number, or start-bit position) fell outside the
    /// domain the operation declares for it.
    #[error("index {index} out of range: {bound}")]
    OutOfRange {
        /// The offending index, as given by the caller.
        index: i64,
        /// A human-readable description of the valid domain.
        bound: String,
    },

    /// A constructor argument was internally inconsistent (a negative
    /// `max`, a value outside `[0, max]`, a size that does not match the
    /// backing word array, ...).
    #[error("bad argument: {message}")]
    BadArgument {
        /// A human-readable description of the problem.
        message: String,
    },

    /// A write was attempted on a structure, or a view of a structure,
    /// that is read-only.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// The name of the attempted operation.
        operation: &'static str,
    },
}

impl Error {
    /// Builds an [`Error::OutOfRange`] for `index`, describing the valid
    /// domain as `bound`.
    pub fn out_of_range(index: i64, bound: impl Into<String>) -> Self {
        Error::OutOfRange {
            index,
            bound: bound.into(),
        }
    }

    /// Builds an [`Error::BadArgument`] with the given message.
    pub fn bad_argument(message: impl Into<String>) -> Self {
        Error::BadArgument {
            message: message.into(),
        }
    }

    /// Builds an [`Error::Unsupported`] for the named operation.
    pub fn unsupported(operation: &'static str) -> Self {
        Error::Unsupported { operation }
    }
}

/// Shorthand for `Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;
