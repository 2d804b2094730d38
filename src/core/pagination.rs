//! Paginated listing shared by every collection endpoint.
//!
//! Lists are ordered by `created_at` descending and return the total row count
//! of the filtered query alongside the requested slice.

use crate::config::settings::PaginationSettings;
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Select,
};
use serde::Deserialize;

/// Raw `page` / `recordPerPage` / `startIndex` query parameters.
///
/// Values are kept as strings so a malformed number falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(rename = "recordPerPage")]
    pub record_per_page: Option<String>,
    #[serde(rename = "startIndex")]
    pub start_index: Option<String>,
}

/// Resolved offset and limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageQuery {
    /// Resolves the query against the configured defaults.
    ///
    /// `recordPerPage` below 1 or unparsable uses the default and is capped at
    /// `max_per_page`. `startIndex`, when given, replaces the offset computed
    /// from `page`.
    #[must_use]
    pub fn resolve(&self, settings: &PaginationSettings) -> PageRequest {
        let limit = parse_positive(self.record_per_page.as_deref())
            .unwrap_or(settings.default_per_page)
            .min(settings.max_per_page.max(1));
        let page = parse_positive(self.page.as_deref()).unwrap_or(1);

        let offset = self
            .start_index
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or_else(|| (page - 1).saturating_mul(limit));

        PageRequest { offset, limit }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value >= 1)
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows matching the filter, ignoring the page window
    pub total_count: u64,
    pub items: Vec<T>,
}

/// Counts `select` and fetches the requested window, newest first.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    created_at: E::Column,
    request: PageRequest,
) -> Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total_count = select.clone().count(db).await?;
    let items = select
        .order_by_desc(created_at)
        .offset(request.offset)
        .limit(request.limit)
        .all(db)
        .await?;

    Ok(Page { total_count, items })
}
