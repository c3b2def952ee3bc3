//! Paged result envelope.

use serde::Serialize;

/// One page of items plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagedModel<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> PagedModel<T> {
    pub fn new(total: u64, items: Vec<T>) -> Self {
        Self { total, items }
    }

    /// Page an ordered sequence: `total` is the full length, `items` the
    /// window after skipping `skip` and taking at most `take`.
    pub fn from_ordered(all: Vec<T>, skip: usize, take: usize) -> Self {
        let total = all.len() as u64;
        let items = all.into_iter().skip(skip).take(take).collect();
        Self { total, items }
    }
}
