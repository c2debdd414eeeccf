//! Unlocked data keys, indexed by control key id

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::crypto::DerivedKey;
use crate::error::{MoneyWiseError, MoneyWiseResult};

#[derive(Clone, Default)]
pub struct KeyRing {
    keys: HashMap<u32, Rc<DerivedKey>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, control_key: u32, key: DerivedKey) {
        self.keys.insert(control_key, Rc::new(key));
    }

    pub fn contains(&self, control_key: u32) -> bool {
        self.keys.contains_key(&control_key)
    }

    /// The data key for a control key, which must have been unlocked
    pub fn key(&self, control_key: u32) -> MoneyWiseResult<&DerivedKey> {
        self.keys
            .get(&control_key)
            .map(|key| &**key)
            .ok_or_else(|| {
                MoneyWiseError::Encryption(format!("Control key {} is not unlocked", control_key))
            })
    }

    /// Drop every key whose control key is not in `live`
    pub fn retain(&mut self, live: &[u32]) {
        self.keys.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&u32> = self.keys.keys().collect();
        ids.sort();
        f.debug_struct("KeyRing").field("control_keys", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_retain() {
        let mut ring = KeyRing::new();
        ring.insert(1, DerivedKey::generate());
        ring.insert(2, DerivedKey::generate());
        assert!(ring.key(1).is_ok());
        assert!(ring.key(3).is_err());

        ring.retain(&[2]);
        assert!(!ring.contains(1));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_clone_shares_keys() {
        let mut ring = KeyRing::new();
        ring.insert(1, DerivedKey::generate());
        let copy = ring.clone();
        assert_eq!(copy.key(1).unwrap().as_bytes(), ring.key(1).unwrap().as_bytes());
    }
}
