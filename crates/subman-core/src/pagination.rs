//! Pagination arithmetic

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Number of pages needed to show `total` items, `limit` per page
///
/// # Errors
/// - `Error::InvalidArgument` if `limit <= 0` or `total < 0`
pub fn total_pages(total: i64, limit: i64) -> Result<i64> {
    if limit <= 0 {
        return Err(Error::InvalidArgument(format!(
            "limit must be positive, got {}",
            limit
        )));
    }
    if total < 0 {
        return Err(Error::InvalidArgument(format!(
            "total must not be negative, got {}",
            total
        )));
    }
    Ok((total + limit - 1) / limit)
}

/// A validated page/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamp raw query values into a usable request
    ///
    /// Missing or non-positive values fall back to the defaults (page 1,
    /// limit 10); limits above 100 are capped at 100.
    pub fn clamped(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Self { page, limit }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results plus the size of the whole collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(25, 10).unwrap(), 3);
        assert_eq!(total_pages(0, 10).unwrap(), 0);
        assert_eq!(total_pages(10, 10).unwrap(), 1);
        assert_eq!(total_pages(11, 10).unwrap(), 2);
        assert_eq!(total_pages(1, 100).unwrap(), 1);
    }

    #[test]
    fn test_total_pages_rejects_bad_arguments() {
        assert!(matches!(total_pages(5, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(total_pages(5, -3), Err(Error::InvalidArgument(_))));
        assert!(matches!(total_pages(-1, 10), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_clamped_defaults() {
        assert_eq!(PageRequest::clamped(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::clamped(Some(0), Some(0)),
            PageRequest { page: 1, limit: 10 }
        );
        assert_eq!(
            PageRequest::clamped(Some(-4), Some(-1)),
            PageRequest { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_clamped_caps_limit() {
        assert_eq!(PageRequest::clamped(Some(3), Some(500)).limit, 100);
        assert_eq!(PageRequest::clamped(Some(3), Some(100)).limit, 100);
        assert_eq!(PageRequest::clamped(Some(3), Some(25)).limit, 25);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::clamped(Some(1), Some(10)).offset(), 0);
        assert_eq!(PageRequest::clamped(Some(2), Some(10)).offset(), 10);
        assert_eq!(PageRequest::clamped(Some(4), Some(25)).offset(), 75);
    }
}
