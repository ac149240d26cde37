//! Success envelopes shared by all handlers.
//!
//! Every response carries `success` and `status`; list responses add a
//! `pagination` block reflecting the pre-slice total. Error responses use
//! the mirror-image envelope produced by [`crate::error::ApiError`].

use serde::Serialize;
use stockroom_core::queryset::Paginated;
use stockroom_index::PaginatedHits;

/// Pagination metadata echoed on list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: usize,
    pub pages: usize,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
}

impl<T> From<&Paginated<T>> for Pagination {
    fn from(page: &Paginated<T>) -> Self {
        Pagination {
            total: page.total,
            pages: page.pages,
            next_page: page.next_page,
            prev_page: page.prev_page,
        }
    }
}

impl From<&PaginatedHits> for Pagination {
    fn from(page: &PaginatedHits) -> Self {
        Pagination {
            total: page.total,
            pages: page.pages,
            next_page: page.next_page,
            prev_page: page.prev_page,
        }
    }
}

/// Confirmation envelope with no payload (signup, deletes).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    pub status: u16,
}

impl MessageResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
            status,
        }
    }
}

/// Envelope carrying a single payload (create, detail, patch).
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub status: u16,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        DataResponse {
            success: true,
            message: message.into(),
            status,
            data,
        }
    }
}

/// Envelope carrying a page of payloads.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        ListResponse {
            success: true,
            data,
            pagination,
        }
    }
}
