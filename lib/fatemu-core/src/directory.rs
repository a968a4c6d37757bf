//! The file directory: one entry record per logical file.
//!
//! Nothing is cached between operations; every call reads the records it
//! needs and writes back what it changed.

use record_store::RecordStore;

use crate::layout::{entry_record_name, validate_name};
use crate::{DirectoryEntry, ENTRY_SUFFIX, FatError, Result, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListFilter {
    Active,
    Trashed,
}

impl ListFilter {
    fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            ListFilter::Active => !entry.in_trash,
            ListFilter::Trashed => entry.in_trash,
        }
    }
}

pub(crate) struct Directory<'a> {
    store: &'a mut dyn RecordStore,
}

impl<'a> Directory<'a> {
    pub fn new(store: &'a mut dyn RecordStore) -> Self {
        Self { store }
    }

    /// Create and persist a new, empty, active entry. An existing entry with
    /// the same name is replaced; callers decide whether that is allowed.
    pub fn create(&mut self, name: &str) -> Result<DirectoryEntry> {
        validate_name(name)?;

        let entry = DirectoryEntry::new(name, Timestamp::now());
        self.update(&entry)?;
        log::debug!("created entry '{name}'");
        Ok(entry)
    }

    fn load(&self, record: &str) -> Result<DirectoryEntry> {
        let text = self
            .store
            .read(record)
            .map_err(|err| FatError::from_store(record, err))?;
        let entry = DirectoryEntry::decode(record, &text)?;
        if entry_record_name(&entry.name) != record {
            return Err(FatError::format(
                record,
                format!("holds the entry of '{}'", entry.name),
            ));
        }

        Ok(entry)
    }

    pub fn find(&self, name: &str) -> Result<Option<DirectoryEntry>> {
        match self.load(&entry_record_name(name)) {
            Ok(entry) => Ok(Some(entry)),
            Err(FatError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn get(&self, name: &str) -> Result<DirectoryEntry> {
        self.find(name)?
            .ok_or_else(|| FatError::NotFound(name.to_owned()))
    }

    /// All entries matching `filter`, in store order.
    pub fn list(&self, filter: ListFilter) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for record in self.store.list(ENTRY_SUFFIX)? {
            match self.load(&record) {
                Ok(entry) => {
                    if filter.matches(&entry) {
                        entries.push(entry);
                    }
                }
                Err(FatError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(entries)
    }

    /// Persist `entry` as it is.
    pub fn update(&mut self, entry: &DirectoryEntry) -> Result<()> {
        let record = entry_record_name(&entry.name);
        let text = entry.encode(&record)?;
        log::trace!("write entry {record}");
        self.store.write(&record, &text).map_err(FatError::Store)
    }

    pub fn mark_trashed(&mut self, entry: &mut DirectoryEntry) -> Result<()> {
        if entry.in_trash {
            return Err(FatError::validation(format!(
                "'{}' is already in the trash",
                entry.name
            )));
        }

        let mut trashed = entry.clone();
        trashed.in_trash = true;
        trashed.deleted_at = Some(Timestamp::now());
        self.update(&trashed)?;
        *entry = trashed;
        Ok(())
    }

    pub fn mark_restored(&mut self, entry: &mut DirectoryEntry) -> Result<()> {
        if !entry.in_trash {
            return Err(FatError::validation(format!(
                "'{}' is not in the trash",
                entry.name
            )));
        }

        let mut restored = entry.clone();
        restored.in_trash = false;
        restored.deleted_at = None;
        self.update(&restored)?;
        *entry = restored;
        Ok(())
    }
}
