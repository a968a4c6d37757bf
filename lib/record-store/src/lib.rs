//! RecordStore trait and implementations.
//!
//! A record store is a flat namespace of named text records. Each record
//! can be written (created or replaced as a whole), read, deleted, and
//! enumerated by name suffix. Nothing is atomic beyond a single record,
//! and enumeration order is unspecified.
//!
//! Two implementations live here:
//! - [`MemRecordStore`]: a hash map, for tests and scratch use;
//! - `DirRecordStore` (feature `dir-store`): one file per record in a
//!   directory on the host filesystem.

#[cfg(feature = "dir-store")]
pub mod dir_record_store;

#[cfg(feature = "dir-store")]
pub use dir_record_store::DirRecordStore;

use std::collections::HashMap;
use std::io::{ErrorKind, Result};

/// Persisted key-to-text storage.
pub trait RecordStore {
    /// Whether a record with this name exists.
    fn exists(&self, name: &str) -> Result<bool>;

    /// Read a whole record. `ErrorKind::NotFound` if it does not exist.
    fn read(&self, name: &str) -> Result<String>;

    /// Create or replace a record.
    fn write(&mut self, name: &str, text: &str) -> Result<()>;

    /// Remove a record. `ErrorKind::NotFound` if it does not exist.
    fn delete(&mut self, name: &str) -> Result<()>;

    /// Names of all records ending with `suffix`, in no particular order.
    fn list(&self, suffix: &str) -> Result<Vec<String>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn exists(&self, name: &str) -> Result<bool> {
        (**self).exists(name)
    }

    fn read(&self, name: &str) -> Result<String> {
        (**self).read(name)
    }

    fn write(&mut self, name: &str, text: &str) -> Result<()> {
        (**self).write(name, text)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        (**self).delete(name)
    }

    fn list(&self, suffix: &str) -> Result<Vec<String>> {
        (**self).list(suffix)
    }
}

#[derive(Default, Debug, Clone)]
pub struct MemRecordStore {
    records: HashMap<String, String>,
}

impl MemRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of records stored.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All record names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.keys().cloned().collect();
        names.sort();
        names
    }
}

impl RecordStore for MemRecordStore {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.records.contains_key(name))
    }

    fn read(&self, name: &str) -> Result<String> {
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFound.into())
    }

    fn write(&mut self, name: &str, text: &str) -> Result<()> {
        log::trace!("mem store: write {name} ({} bytes)", text.len());
        self.records.insert(name.to_owned(), text.to_owned());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        log::trace!("mem store: delete {name}");
        match self.records.remove(name) {
            Some(_) => Ok(()),
            None => Err(ErrorKind::NotFound.into()),
        }
    }

    fn list(&self, suffix: &str) -> Result<Vec<String>> {
        Ok(self
            .records
            .keys()
            .filter(|name| name.ends_with(suffix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_basic() {
        let mut store = MemRecordStore::new();
        assert!(store.is_empty());
        assert!(!store.exists("a.fat").unwrap());
        assert_eq!(
            store.read("a.fat").err().unwrap().kind(),
            ErrorKind::NotFound
        );

        store.write("a.fat", "one").unwrap();
        store.write("a.0.blk", "two").unwrap();
        store.write("b.fat", "three").unwrap();
        assert_eq!(3, store.len());
        assert!(store.exists("a.fat").unwrap());
        assert_eq!("one", store.read("a.fat").unwrap());

        // Overwrite replaces the whole record.
        store.write("a.fat", "uno").unwrap();
        assert_eq!("uno", store.read("a.fat").unwrap());
        assert_eq!(3, store.len());

        let mut fats = store.list(".fat").unwrap();
        fats.sort();
        assert_eq!(vec!["a.fat".to_owned(), "b.fat".to_owned()], fats);
        assert_eq!(vec!["a.0.blk".to_owned()], store.list(".blk").unwrap());

        store.delete("a.0.blk").unwrap();
        assert_eq!(
            store.delete("a.0.blk").err().unwrap().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(vec!["a.fat".to_owned(), "b.fat".to_owned()], store.names());
    }

    #[test]
    fn boxed_store_delegates() {
        let mut store: Box<dyn RecordStore> = Box::new(MemRecordStore::new());
        store.write("x", "y").unwrap();
        assert!(store.exists("x").unwrap());
        assert_eq!("y", store.read("x").unwrap());
        assert_eq!(vec!["x".to_owned()], store.list("").unwrap());
        store.delete("x").unwrap();
        assert!(!store.exists("x").unwrap());
    }
}
