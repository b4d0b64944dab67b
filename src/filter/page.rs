use serde::Serialize;

use super::types::PageRequest;

/// Rows that can be paged by cursor expose their ordering id.
pub trait Paginated {
    fn cursor_id(&self) -> i64;
}

/// One page of results plus the continuation cursor.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<i64>,
}

impl<T: Paginated> Page<T> {
    /// `next_cursor` is the last id only when the page came back full; the store is never
    /// asked whether another row exists, so a full final page still yields a cursor.
    pub fn from_rows(mut rows: Vec<T>, page: PageRequest) -> Self {
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        rows.truncate(limit);
        let next_cursor = if rows.len() == limit {
            rows.last().map(Paginated::cursor_id)
        } else {
            None
        };
        Self { items: rows, next_cursor }
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
