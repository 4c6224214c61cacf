use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::key::TypeKey;
use crate::registry::SharedObject;

/// Write-once table of every constructed singleton.
pub struct ObjectMap {
    objects: HashMap<TypeKey, ObjectEntry>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    /// Stores `object` under `key` unless an object is already there, in which
    /// case the rejected `object` is handed back.
    pub fn insert(&mut self, key: TypeKey, object: SharedObject) -> Result<(), SharedObject> {
        match self.objects.entry(key) {
            Entry::Occupied(_) => Err(object),
            Entry::Vacant(slot) => {
                slot.insert(ObjectEntry(object));
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<&ObjectEntry> {
        self.objects.get(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

pub struct ObjectEntry(SharedObject);

impl ObjectEntry {
    pub fn clone_shared(&self) -> SharedObject {
        Arc::clone(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::key;

    use super::*;

    #[test]
    fn object_map_insert_succeeds() {
        let mut map = ObjectMap::new();

        assert!(map.insert(key::of::<i32>(), Arc::new(42i32)).is_ok());
        assert!(map.insert(key::of::<&str>(), Arc::new("str")).is_ok());
        assert_eq!(map.len(), 2);

        let object = map.get(&key::of::<i32>()).unwrap();
        assert!(object.clone_shared().downcast::<i64>().is_err());
        assert_eq!(*object.clone_shared().downcast::<i32>().unwrap(), 42);
    }

    #[test]
    fn object_map_insert_fails_when_key_is_occupied() {
        let mut map = ObjectMap::new();
        let original = Arc::new(1i32);

        assert!(map.insert(key::of::<i32>(), original.clone()).is_ok());
        let rejected = map.insert(key::of::<i32>(), Arc::new(2i32)).unwrap_err();
        assert_eq!(*rejected.downcast::<i32>().unwrap(), 2);

        let stored = map.get(&key::of::<i32>()).unwrap().clone_shared();
        let stored = stored.downcast::<i32>().unwrap();
        assert!(Arc::ptr_eq(&stored, &original));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn object_map_get_fails_when_key_not_found() {
        let map = ObjectMap::new();

        assert!(map.get(&key::of::<i32>()).is_none());
    }
}
