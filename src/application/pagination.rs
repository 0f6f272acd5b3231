//! Offset pagination shared by the storage and facade layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size {page_size} must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize { page_size: u32 },
}

/// A validated, zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page_size: u32,
    page: u32,
}

impl PageRequest {
    pub fn new(page_size: u32, page: u32) -> Result<Self, PaginationError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidPageSize { page_size });
        }
        Ok(Self { page_size, page })
    }

    /// Build a request from the 1-based page number clients send.
    ///
    /// A missing page or page `0` resolves to the first page.
    pub fn from_one_based(page_size: u32, page: Option<u32>) -> Result<Self, PaginationError> {
        let zero_based = page.unwrap_or(1).saturating_sub(1);
        Self::new(page_size, zero_based)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.page_size)
    }

    /// Slice `items` the same way storage applies LIMIT/OFFSET.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(start)
            .take(self.page_size as usize)
            .cloned()
            .collect()
    }
}
