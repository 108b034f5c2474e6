//! Pagination and sorting parameters shared by repositories and readers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejected pagination input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Pagination limit must be between 0 and {max}, got {actual}")]
    LimitOutOfRange { max: u32, actual: i64 },

    #[error("Pagination offset must not be negative, got {0}")]
    NegativeOffset(i64),
}

/// Rejected sorting input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortingError {
    #[error("Invalid sorting field '{0}'")]
    UnknownField(String),

    #[error("Invalid sorting order '{0}'")]
    UnknownOrder(String),
}

/// A validated page window.
///
/// A limit of zero is legal and always yields an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    limit: u32,
    offset: u64,
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 1000;

    /// # Errors
    ///
    /// - `LimitOutOfRange` when `limit` is negative or above [`Pagination::MAX_LIMIT`]
    /// - `NegativeOffset` when `offset` is negative
    pub fn new(limit: i64, offset: i64) -> Result<Self, PaginationError> {
        if !(0..=i64::from(Self::MAX_LIMIT)).contains(&limit) {
            return Err(PaginationError::LimitOutOfRange {
                max: Self::MAX_LIMIT,
                actual: limit,
            });
        }
        if offset < 0 {
            return Err(PaginationError::NegativeOffset(offset));
        }
        Ok(Self {
            limit: limit as u32,
            offset: offset as u64,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Applies the window to an already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
            .take(self.limit as usize)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortingOrder {
    #[default]
    Asc,
    Desc,
}

impl SortingOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortingOrder::Asc => "ASC",
            SortingOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortingOrder {
    type Err = SortingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortingOrder::Asc),
            "DESC" => Ok(SortingOrder::Desc),
            _ => Err(SortingError::UnknownOrder(s.to_string())),
        }
    }
}

/// Sort instruction over a typed, allow-listed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sorting<F> {
    pub field: F,
    pub order: SortingOrder,
}

impl<F> Sorting<F> {
    pub fn new(field: F, order: SortingOrder) -> Self {
        Self { field, order }
    }

    pub fn asc(field: F) -> Self {
        Self::new(field, SortingOrder::Asc)
    }

    pub fn desc(field: F) -> Self {
        Self::new(field, SortingOrder::Desc)
    }
}
