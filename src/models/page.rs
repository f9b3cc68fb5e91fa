use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// 1-based page selection, as sent in `page` / `size` query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
    pub fn size(&self) -> usize {
        self.size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cuts one page out of records already sorted by the listing's sort key.
    pub fn from_sorted(records: Vec<T>, query: &PageQuery) -> Self {
        let page = query.page();
        let size = query.size();
        let total_items = records.len();
        let total_pages = total_items.div_ceil(size);

        let items = records
            .into_iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .collect();

        Self {
            items,
            page,
            size,
            total_items,
            total_pages,
        }
    }
}
