//! `RowBuffer`: the staged set of text rows.
//!
//! Writes land here immediately. Nothing in this buffer is visible to the
//! render loop until it is published through a [`CommitGate`].
//!
//! [`CommitGate`]: super::CommitGate

use crate::error::RowError;

/// End bound of a clear range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEnd {
    /// Exclusive end index.
    Index(usize),
    /// Through the last row.
    Last,
}

/// Which rows to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowSpan {
    /// Every row.
    #[default]
    All,
    /// Exactly one row.
    Row(usize),
    /// The half-open range `start..end`.
    Range {
        /// First row cleared.
        start: usize,
        /// End of the range.
        end: RowEnd,
    },
}

impl RowSpan {
    /// Build a span from optional bounds.
    ///
    /// - no bounds clears all rows,
    /// - only `start` clears that one row,
    /// - only `end` clears from the first row,
    /// - both clear `start..end`.
    pub const fn from_bounds(start: Option<usize>, end: Option<RowEnd>) -> Self {
        match (start, end) {
            (None, None) => Self::All,
            (Some(row), None) => Self::Row(row),
            (None, Some(end)) => Self::Range { start: 0, end },
            (Some(start), Some(end)) => Self::Range { start, end },
        }
    }

    /// Resolve the span to concrete `start..end` indices for `row_count` rows.
    pub fn resolve(self, row_count: usize) -> Result<std::ops::Range<usize>, RowError> {
        let (start, end) = match self {
            Self::All => return Ok(0..row_count),
            Self::Row(row) => (row, row.saturating_add(1)),
            Self::Range { start, end: RowEnd::Index(end) } => (start, end),
            Self::Range { start, end: RowEnd::Last } => (start, row_count),
        };

        if start >= row_count || end <= start || end > row_count {
            return Err(RowError::RangeInvalid {
                start,
                end,
                row_count,
            });
        }
        Ok(start..end)
    }
}

/// A fixed number of text rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBuffer {
    rows: Vec<String>,
}

impl RowBuffer {
    /// Create a buffer with `row_count` empty rows.
    pub fn new(row_count: usize) -> Self {
        Self {
            rows: vec![String::new(); row_count],
        }
    }

    /// Number of rows. Fixed at construction.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Replace the text of one row. The text is stored as given.
    pub fn write_row(&mut self, index: usize, text: impl Into<String>) -> Result<(), RowError> {
        let row_count = self.rows.len();
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(RowError::RowIndexOutOfRange { index, row_count })?;
        *slot = text.into();
        Ok(())
    }

    /// Empty the rows selected by `span`. Nothing changes on error.
    pub fn clear_rows(&mut self, span: RowSpan) -> Result<(), RowError> {
        let range = span.resolve(self.rows.len())?;
        for row in &mut self.rows[range] {
            row.clear();
        }
        Ok(())
    }

    /// Text of one row.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(String::as_str)
    }

    /// All rows in order.
    #[inline]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Whether every row is empty.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(String::is_empty)
    }
}
