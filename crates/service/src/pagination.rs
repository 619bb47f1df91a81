//! Pagination and ordering utilities for list operations
//!
//! Lists are always ordered; the primary key ascending is the final tie-breaker
//! so page boundaries are stable absent concurrent writes.

use models::errors::FieldErrors;
use sea_orm::{DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, Select};
use serde::Serialize;

use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

impl Pagination {
    /// Validate raw request values. Zero is rejected; sizes above the ceiling
    /// are capped.
    pub fn from_request(page: Option<u64>, page_size: Option<u64>) -> Result<Self, ServiceError> {
        let mut errs = FieldErrors::new();
        let page = page.unwrap_or(1);
        let per_page = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            errs.add("page", "must be >= 1");
        }
        if per_page == 0 {
            errs.add("page_size", "must be >= 1");
        }
        errs.finish()?;
        Ok(Self { page, per_page: per_page.min(MAX_PAGE_SIZE) })
    }

    /// Clamp to sane defaults and return `(page_index, per_page)`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PAGE_SIZE);
        (page - 1, per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: DEFAULT_PAGE_SIZE } }
}

/// `field` ascending or `-field` descending
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self { field: field.to_string(), descending })
    }
}

/// Options shared by every list operation.
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub pagination: Pagination,
    pub sort: Option<Sort>,
}

impl ListOptions {
    pub fn new(pagination: Pagination, sort: Option<Sort>) -> Self { Self { pagination, sort } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(opts: Pagination, total: u64) -> Self {
        let (idx, per_page) = opts.normalize();
        Self { page: idx + 1, page_size: per_page, total, total_pages: total.div_ceil(per_page) }
    }
}

#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Row offset of the page, or `None` when it lies past `total` or does not
/// fit in `u64`.
fn page_offset(page_idx: u64, per_page: u64, total: u64) -> Option<u64> {
    page_idx.checked_mul(per_page).filter(|offset| *offset < total)
}

/// Order `select` by the requested field (resolved against `allowed`), then
/// by `id` ascending.
pub fn apply_sort<E>(
    select: Select<E>,
    sort: Option<&Sort>,
    allowed: &[(&str, E::Column)],
    id: E::Column,
) -> Result<Select<E>, ServiceError>
where
    E: EntityTrait,
{
    let mut select = select;
    if let Some(s) = sort {
        let column = allowed
            .iter()
            .find(|(name, _)| *name == s.field)
            .map(|(_, col)| *col)
            .ok_or_else(|| {
                let names: Vec<&str> = allowed.iter().map(|(name, _)| *name).collect();
                ServiceError::invalid("sort", format!("unknown sort field '{}'; allowed: {}", s.field, names.join(", ")))
            })?;
        select = select.order_by(column, if s.descending { Order::Desc } else { Order::Asc });
    }
    Ok(select.order_by_asc(id))
}

/// Count and fetch one page. A page past the end yields no items but the
/// true total.
pub async fn fetch_page<E>(db: &DatabaseConnection, select: Select<E>, opts: Pagination) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let (page_idx, per_page) = opts.normalize();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = match page_offset(page_idx, per_page, total) {
        Some(_) => paginator.fetch_page(page_idx).await?,
        None => Vec::new(),
    };
    Ok(Page { items, meta: PageMeta::new(opts, total) })
}
