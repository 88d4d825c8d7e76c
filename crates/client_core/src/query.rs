//! Query descriptor composition: filters + sort + pagination -> one immutable request value.

use thiserror::Error;

use crate::{
    filters::FilterMap,
    sort::{SortClause, SortController, SortMeta},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Result<Self, QueryError> {
        if page_size == 0 {
            return Err(QueryError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn first_page(self) -> Self {
        Self { page: 0, ..self }
    }
}

/// Everything that determines one list fetch. Equal descriptors encode to equal requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    pub filters: FilterMap,
    pub sort: Vec<SortClause>,
    pub pagination: Pagination,
}

impl QueryDescriptor {
    /// `page`, `size`, every filter in key order, then one `sort` pair per clause in precedence order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(2 + self.filters.len() + self.sort.len());
        pairs.push(("page".to_string(), self.pagination.page.to_string()));
        pairs.push(("size".to_string(), self.pagination.page_size.to_string()));
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs.extend(
            self.sort
                .iter()
                .map(|clause| ("sort".to_string(), clause.to_param())),
        );
        pairs
    }
}

/// Current filter, sort and pagination inputs.
///
/// Any filter or sort change resets the page index to 0 because the previous
/// index no longer points at the same rows. Pagination changes leave filters
/// and sort alone.
#[derive(Debug, Clone, Default)]
pub struct QueryComposer {
    filters: FilterMap,
    sort: SortController,
    pagination: Pagination,
}

impl QueryComposer {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }

    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            filters: self.filters.clone(),
            sort: self.sort.clauses().to_vec(),
            pagination: self.pagination,
        }
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn sort_meta(&self, column: &str) -> SortMeta {
        self.sort.sort_meta(column)
    }

    pub fn set_filters(&mut self, filters: FilterMap) -> QueryDescriptor {
        self.filters = filters;
        self.reset_page()
    }

    pub fn toggle_sort(&mut self, column: &str, multi: bool) -> QueryDescriptor {
        self.sort.toggle(column, multi);
        self.reset_page()
    }

    pub fn set_sort(&mut self, clauses: Vec<SortClause>) -> QueryDescriptor {
        self.sort = SortController::from_clauses(clauses);
        self.reset_page()
    }

    /// Data changed elsewhere; start again from the first page.
    pub fn refresh(&mut self) -> QueryDescriptor {
        self.reset_page()
    }

    pub fn set_page(&mut self, page: u32) -> QueryDescriptor {
        self.pagination.page = page;
        self.descriptor()
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<QueryDescriptor, QueryError> {
        self.pagination = Pagination::new(self.pagination.page, page_size)?;
        Ok(self.descriptor())
    }

    pub fn set_pagination(&mut self, pagination: Pagination) -> QueryDescriptor {
        self.pagination = pagination;
        self.descriptor()
    }

    fn reset_page(&mut self) -> QueryDescriptor {
        self.pagination = self.pagination.first_page();
        self.descriptor()
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
