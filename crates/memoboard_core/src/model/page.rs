//! Paging and sorting envelopes shared by both repositories.
//!
//! # Invariants
//! - Page numbers are zero-indexed.
//! - `size` is within `1..=PAGE_SIZE_MAX`.
//! - `total_pages` is `ceil(total_elements / page_size)`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest page size accepted by list queries.
pub const PAGE_SIZE_MAX: u32 = 2000;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Single-field ordering. Field names are resolved per repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    /// Ascending order on `field`.
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn ascending(mut self) -> Self {
        self.direction = Direction::Asc;
        self
    }

    pub fn descending(mut self) -> Self {
        self.direction = Direction::Desc;
        self
    }
}

/// Requested page window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl PageRequest {
    /// Unsorted request for page `page` (zero-indexed) of `size` rows.
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn validate(&self) -> Result<(), PageRequestError> {
        if self.size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        if self.size > PAGE_SIZE_MAX {
            return Err(PageRequestError::SizeTooLarge {
                max: PAGE_SIZE_MAX,
                actual: self.size,
            });
        }
        Ok(())
    }
}

/// Rejected page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    ZeroSize,
    SizeTooLarge { max: u32, actual: u32 },
}

impl Display for PageRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "page size must be at least 1"),
            Self::SizeTooLarge { max, actual } => {
                write!(f, "page size {actual} exceeds limit {max}")
            }
        }
    }
}

impl Error for PageRequestError {}

/// One page of results plus the totals needed for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size);
        Self {
            items,
            total_elements,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            page_number: request.page,
            page_size: request.size,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page_number.saturating_add(1) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 0
    }

    pub fn is_first(&self) -> bool {
        self.page_number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Converts the items while keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}
