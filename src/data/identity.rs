//! Per-list identity manager
//!
//! Hands out ids within one list and rejects duplicates. Every list owns its
//! own manager, so derived lists never share counters with their source.

use std::collections::HashSet;

use crate::error::{MoneyWiseError, MoneyWiseResult};

#[derive(Debug, Clone, Default)]
pub struct IdManager {
    max_id: u32,
    ids: HashSet<u32>,
}

impl IdManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no item currently holds `id`
    pub fn is_id_unique(&self, id: u32) -> bool {
        !self.ids.contains(&id)
    }

    /// Register an id, allocating `max_id + 1` when `id` is 0
    pub fn set_new_id(&mut self, id: u32, item_type: &'static str) -> MoneyWiseResult<u32> {
        let id = if id == 0 {
            self.max_id + 1
        } else if self.is_id_unique(id) {
            id
        } else {
            return Err(MoneyWiseError::duplicate_id(item_type, id));
        };

        self.max_id = self.max_id.max(id);
        self.ids.insert(id);
        Ok(id)
    }

    /// Release an id; the maximum is never lowered
    pub fn deregister(&mut self, id: u32) {
        self.ids.remove(&id);
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
