//! Page-range resolution.
//!
//! User-supplied start/end arguments become a concrete inclusive range here,
//! before any rendering work begins. Only syntactic validation happens at
//! this stage: values must be integers and the range must not be inverted.
//! Whether the pages actually exist is the renderer's call — it knows the
//! document's page count, this module does not.

use crate::error::ConvertError;

/// An inclusive, 1-based page range.
///
/// `end == 0` means "to the last page"; the renderer substitutes the actual
/// page count. Invariants: `start >= 1`, and `end >= start` when `end != 0`.
/// Resolved once per run, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl Default for PageRange {
    /// The whole document: `(1, 0)`.
    fn default() -> Self {
        Self { start: 1, end: 0 }
    }
}

impl PageRange {
    /// Parse optional start/end command inputs.
    ///
    /// Absence of both yields the whole document. A missing end with a
    /// present start means "from `start` to the last page".
    ///
    /// # Errors
    /// [`ConvertError::InvalidPageNumber`] when a value does not parse as an
    /// integer, when `start` is zero, or when the range is inverted. Fatal;
    /// reported before any rendering work.
    pub fn resolve(start: Option<&str>, end: Option<&str>) -> Result<Self, ConvertError> {
        let start = match start {
            Some(s) => parse_page(s)?,
            None => 1,
        };
        let end = match end {
            Some(s) => parse_page(s)?,
            None => 0,
        };

        if start < 1 {
            return Err(ConvertError::InvalidPageNumber {
                value: start.to_string(),
            });
        }
        if end != 0 && end < start {
            return Err(ConvertError::InvalidPageNumber {
                value: format!("{start}-{end}"),
            });
        }

        Ok(Self { start, end })
    }

    /// Substitute the document's page count for an open end.
    pub fn effective_end(&self, total_pages: u32) -> u32 {
        if self.end == 0 {
            total_pages
        } else {
            self.end
        }
    }
}

fn parse_page(value: &str) -> Result<u32, ConvertError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConvertError::InvalidPageNumber {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_arguments_mean_whole_document() {
        assert_eq!(
            PageRange::resolve(None, None).unwrap(),
            PageRange { start: 1, end: 0 }
        );
    }

    #[test]
    fn start_without_end_runs_to_last_page() {
        let r = PageRange::resolve(Some("3"), None).unwrap();
        assert_eq!(r, PageRange { start: 3, end: 0 });
        assert_eq!(r.effective_end(10), 10);
    }

    #[test]
    fn explicit_range() {
        let r = PageRange::resolve(Some("2"), Some("5")).unwrap();
        assert_eq!(r, PageRange { start: 2, end: 5 });
        assert_eq!(r.effective_end(10), 5);
    }

    #[test]
    fn non_integer_is_invalid() {
        let err = PageRange::resolve(Some("three"), None).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidPageNumber { ref value } if value == "three"
        ));
    }

    #[test]
    fn zero_start_is_invalid() {
        assert!(PageRange::resolve(Some("0"), Some("4")).is_err());
    }

    #[test]
    fn inverted_range_is_invalid() {
        assert!(PageRange::resolve(Some("5"), Some("2")).is_err());
    }

    #[test]
    fn no_upper_bound_validation_here() {
        // 10_000 may exceed the document; only the renderer can tell.
        assert!(PageRange::resolve(Some("1"), Some("10000")).is_ok());
    }
}
