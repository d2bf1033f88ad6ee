use std::collections::HashMap;

use crate::storage::SeriesRef;

/// Maps raw series identities to the references issued by the storage
/// engine, so repeated samples of a series skip label-set resolution.
///
/// Grows without bound and never expires entries; its lifetime is a single
/// load operation.
#[derive(Debug, Default)]
pub struct SeriesRefCache {
    refs: HashMap<String, SeriesRef>,
}

impl SeriesRefCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, identity: &str) -> Option<SeriesRef> {
        self.refs.get(identity).copied()
    }

    pub fn insert(&mut self, identity: &str, r: SeriesRef) {
        self.refs.insert(identity.to_owned(), r);
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
