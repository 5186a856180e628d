//! Page requests and paged result envelopes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Page number must be at least 1, got {0}")]
    InvalidPageNumber(i64),

    #[error("Page size must be at least 1, got {0}")]
    InvalidPageSize(i64),
}

pub type PaginationResult<T> = Result<T, PaginationError>;

/// Largest offset or limit a page request produces (`i64::MAX`).
pub const MAX_BOUND: u64 = i64::MAX as u64;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u64,
    page_size: u64,
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> PaginationResult<Self> {
        if page_number < 1 {
            return Err(PaginationError::InvalidPageNumber(page_number));
        }
        if page_size < 1 {
            return Err(PaginationError::InvalidPageSize(page_size));
        }

        Ok(Self {
            page_number: page_number as u64,
            page_size: page_size as u64,
        })
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) * size`, capped at [`MAX_BOUND`] so SQL
    /// backends can bind it as a signed 64-bit integer.
    pub fn offset(&self) -> u64 {
        (self.page_number - 1)
            .saturating_mul(self.page_size)
            .min(MAX_BOUND)
    }

    pub fn limit(&self) -> u64 {
        self.page_size.min(MAX_BOUND)
    }
}

/// One page of items plus the metadata needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PaginatedList<T> {
    /// Wraps an already-sliced page. `total_count` is the size of the whole
    /// result set, not of `items`.
    pub fn new(items: Vec<T>, total_count: u64, page: PageRequest) -> Self {
        let total_pages = total_count.div_ceil(page.page_size);

        Self {
            items,
            page_number: page.page_number,
            page_size: page.page_size,
            total_pages,
            total_count,
            has_previous_page: page.page_number > 1,
            has_next_page: page.page_number < total_pages,
        }
    }

    /// Slices an in-memory sequence.
    pub fn from_vec(all: Vec<T>, page: PageRequest) -> Self {
        let total_count = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();

        Self::new(items, total_count, page)
    }

    /// Converts each item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_request_rejects_non_positive_values() {
        assert_eq!(
            PageRequest::new(0, 10),
            Err(PaginationError::InvalidPageNumber(0))
        );
        assert_eq!(
            PageRequest::new(1, -5),
            Err(PaginationError::InvalidPageSize(-5))
        );
    }

    #[test]
    fn test_offset_and_limit() {
        let page = PageRequest::new(3, 20).unwrap();
        assert_eq!(page.offset(), 40);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn test_huge_page_number_stays_within_signed_range() {
        let page = PageRequest::new(i64::MAX, 10).unwrap();
        assert_eq!(page.offset(), MAX_BOUND);
        assert!(i64::try_from(page.offset()).is_ok());
        assert!(i64::try_from(page.limit()).is_ok());

        let list = PaginatedList::from_vec((1..=25).collect::<Vec<_>>(), page);
        assert!(list.items.is_empty());
        assert_eq!(list.total_count, 25);
        assert_eq!(list.total_pages, 3);
        assert!(!list.has_next_page);
    }

    #[test]
    fn test_middle_page() {
        let page = PageRequest::new(2, 10).unwrap();
        let list = PaginatedList::from_vec((1..=25).collect::<Vec<_>>(), page);

        assert_eq!(list.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(list.total_pages, 3);
        assert_eq!(list.total_count, 25);
        assert!(list.has_previous_page);
        assert!(list.has_next_page);
    }

    #[test]
    fn test_last_partial_page() {
        let page = PageRequest::new(3, 10).unwrap();
        let list = PaginatedList::from_vec((1..=25).collect::<Vec<_>>(), page);

        assert_eq!(list.items.len(), 5);
        assert!(!list.has_next_page);
    }

    #[test]
    fn test_page_beyond_range_is_empty_with_count() {
        let page = PageRequest::new(9, 10).unwrap();
        let list = PaginatedList::from_vec(vec!["a"; 12], page);

        assert!(list.items.is_empty());
        assert_eq!(list.total_count, 12);
        assert_eq!(list.total_pages, 2);
        assert!(list.has_previous_page);
        assert!(!list.has_next_page);
    }

    #[test]
    fn test_empty_source() {
        let page = PageRequest::new(1, 10).unwrap();
        let list = PaginatedList::from_vec(Vec::<i32>::new(), page);

        assert_eq!(list.total_pages, 0);
        assert!(!list.has_previous_page);
        assert!(!list.has_next_page);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = PageRequest::new(1, 2).unwrap();
        let list = PaginatedList::from_vec(vec![1, 2, 3], page).map(|n| n.to_string());

        assert_eq!(list.items, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(list.total_count, 3);
        assert!(list.has_next_page);
    }

    #[test]
    fn test_serialized_field_names() {
        let page = PageRequest::new(1, 10).unwrap();
        let json = serde_json::to_value(PaginatedList::from_vec(vec![1], page)).unwrap();

        assert_eq!(json["page_number"], 1);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["has_next_page"], false);
    }

    proptest! {
        #[test]
        fn prop_page_length_matches_remaining_items(
            count in 0usize..500,
            page_number in 1i64..60,
            page_size in 1i64..50,
        ) {
            let page = PageRequest::new(page_number, page_size).unwrap();
            let list = PaginatedList::from_vec(vec![(); count], page);

            let skipped = ((page_number - 1) * page_size) as usize;
            let expected = count.saturating_sub(skipped).min(page_size as usize);
            prop_assert_eq!(list.items.len(), expected);
        }

        #[test]
        fn prop_total_pages_is_ceiling(
            count in 0u64..10_000,
            page_size in 1i64..200,
        ) {
            let page = PageRequest::new(1, page_size).unwrap();
            let list = PaginatedList::<()>::new(Vec::new(), count, page);

            let size = page_size as u64;
            prop_assert_eq!(list.total_pages, (count + size - 1) / size);
            prop_assert!(list.total_pages * size >= count);
        }
    }
}
