//! Query predicates and pagination shared by the store, the analytics
//! aggregators, and the HTTP layer's response envelopes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::ApiError;

/// Half-open `[from, to)` date window, interpreted at UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.from && ts < self.to
    }

    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, ApiError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(ApiError::Validation("page must be >= 1".to_string()));
        }
        if page_size == 0 {
            return Err(ApiError::Validation("page_size must be >= 1".to_string()));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(ApiError::Validation(format!(
                "page_size must be <= {MAX_PAGE_SIZE}"
            )));
        }

        Ok(Self { page, page_size })
    }

    /// Zero-based start offset into a sorted slice.
    pub fn offset(&self) -> usize {
        ((self.page - 1) as usize) * (self.page_size as usize)
    }

    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = self.offset().min(items.len());
        let end = (start + self.page_size as usize).min(items.len());
        items[start..end].to_vec()
    }
}

/// Pagination metadata attached to by-user / list envelopes.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: usize,
}

impl Pagination {
    pub fn new(req: PageRequest, total: usize) -> Self {
        Self {
            page: req.page,
            page_size: req.page_size,
            total,
        }
    }
}

/// Entity-scoped query predicate used by the store and analytics aggregators.
#[derive(Debug, Clone)]
pub struct QueryPredicate {
    pub date_range: Option<DateRange>,
    pub user_id: Option<String>,
    pub repo_name: Option<String>,
}

impl QueryPredicate {
    pub fn all() -> Self {
        Self {
            date_range: None,
            user_id: None,
            repo_name: None,
        }
    }
}

/// Team-scoped analytics envelope: `{data, params}`.
#[derive(Debug, Serialize)]
pub struct TeamEnvelope<T: Serialize> {
    pub data: T,
    pub params: serde_json::Value,
}

/// By-user analytics envelope: `{data:{user_id->metrics}, pagination, params}`.
#[derive(Debug, Serialize)]
pub struct ByUserEnvelope<T: Serialize> {
    pub data: HashMap<String, T>,
    pub pagination: Pagination,
    pub params: serde_json::Value,
}
