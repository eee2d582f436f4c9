//! Error types for the model crate
//!
//! - [`DecodeError`]: recoverable problems in a wire list; collected, never fatal
//! - [`WireError`]: structural problems that stop a property bag from decoding

use crate::entry::ListKind;

/// Recoverable problem found while decoding a wire list
///
/// Decoding always continues; the affected entry is repaired or skipped and
/// the error is reported alongside the decoded value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Quantity suffix present but not a positive integer
    #[error("malformed quantity '{raw}' for '{title}' in {list}; defaulted to 1")]
    MalformedQuantity {
        /// List the entry came from
        list: ListKind,
        /// Title with the suffix stripped
        title: String,
        /// Suffix content as written
        raw: String,
    },

    /// Quantity suffix on a removed item, which is always a single unit
    #[error("quantity ignored for removed item '{title}'")]
    RemovedQuantityIgnored {
        /// Removed item title
        title: String,
    },

    /// Entry with a quantity suffix but nothing before it
    #[error("entry '{raw}' in {list} has no title; skipped")]
    MissingTitle {
        /// List the entry came from
        list: ListKind,
        /// Raw entry text
        raw: String,
    },
}

/// Structural failure decoding a property bag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Delivery date not in `Tue Feb 20 2024` form
    #[error("invalid delivery date '{value}': {reason}")]
    InvalidDeliveryDate {
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Property bag is not valid JSON for the expected shape
    #[error("malformed property bag: {0}")]
    Malformed(String),
}

impl WireError {
    /// Create invalid delivery date error
    pub fn invalid_delivery_date(value: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidDeliveryDate {
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for WireError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}
