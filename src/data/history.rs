//! Stack of prior value sets for one item

use super::values::{DataValues, ValueSet};

/// Ordered stack of snapshots, oldest first
#[derive(Debug, Clone)]
pub struct History<V> {
    stack: Vec<ValueSet<V>>,
}

impl<V> Default for History<V> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<V: DataValues> History<V> {
    pub fn push(&mut self, values: ValueSet<V>) {
        self.stack.push(values);
    }

    pub fn pop(&mut self) -> Option<ValueSet<V>> {
        self.stack.pop()
    }

    /// The most recent snapshot
    pub fn peek(&self) -> Option<&ValueSet<V>> {
        self.stack.last()
    }

    /// The oldest snapshot, i.e. the values as originally loaded or created
    pub fn original(&self) -> Option<&ValueSet<V>> {
        self.stack.first()
    }

    /// Replace the whole history with a single original snapshot
    pub fn set_original(&mut self, original: ValueSet<V>) {
        self.stack.clear();
        self.stack.push(original);
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
