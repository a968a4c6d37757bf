// The externally visible file operations. Each operation builds short-lived
// Directory/ChainAllocator views over the store, so there is a single
// mutable object (the service) and the rest borrow from it per call.

use record_store::RecordStore;

use crate::chain::{ChainAllocator, blocks_needed};
use crate::directory::{Directory, ListFilter};
use crate::layout::validate_name;
use crate::{Config, DirectoryEntry, DuplicateNames, FatError, Result, Timestamp};

pub struct FileService {
    store: Box<dyn RecordStore>,
    config: Config,
}

impl FileService {
    pub fn new(store: Box<dyn RecordStore>, config: Config) -> Self {
        Self { store, config }
    }

    fn directory(&mut self) -> Directory<'_> {
        Directory::new(self.store.as_mut())
    }

    fn chain(&mut self) -> ChainAllocator<'_> {
        ChainAllocator::new(self.store.as_mut(), self.config.max_chain_hops)
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut dyn RecordStore {
        self.store.as_mut()
    }

    fn check_content(&self, content: &str) -> Result<()> {
        let needed = blocks_needed(content);
        if needed > self.config.max_chain_hops {
            return Err(FatError::validation(format!(
                "content needs {needed} blocks, the limit is {}",
                self.config.max_chain_hops
            )));
        }

        Ok(())
    }

    /// Create a file named `name` holding `content`.
    ///
    /// Records are written in this order: the entry (empty), the blocks
    /// (tail first), the entry again (pointing at the blocks). When an
    /// existing file is overwritten, its old chain is freed after the empty
    /// entry is written, so the entry never points at freed blocks.
    pub fn create_file(&mut self, name: &str, content: &str) -> Result<DirectoryEntry> {
        validate_name(name)?;
        self.check_content(content)?;

        let existing = self.directory().find(name)?;
        let old_head = match existing {
            None => None,
            Some(_) if self.config.duplicate_names == DuplicateNames::Reject => {
                return Err(FatError::validation(format!("'{name}' already exists")));
            }
            Some(existing) => {
                log::debug!("'{name}' exists: replacing it");
                existing.head
            }
        };

        let mut entry = self.directory().create(name)?;
        if old_head.is_some() {
            self.chain().free_chain(old_head.as_ref())?;
        }
        entry.head = self.chain().write_chain(content, name)?;
        entry.size_chars = content.chars().count() as u64;
        self.directory().update(&entry)?;

        log::debug!("created '{name}' ({} chars)", entry.size_chars);
        Ok(entry)
    }

    /// Files in the trash if `trashed`, active files otherwise.
    pub fn list_files(&mut self, trashed: bool) -> Result<Vec<DirectoryEntry>> {
        let filter = if trashed {
            ListFilter::Trashed
        } else {
            ListFilter::Active
        };
        self.directory().list(filter)
    }

    /// Look a file up by name, whether it is in the trash or not.
    pub fn find_file(&mut self, name: &str) -> Result<Option<DirectoryEntry>> {
        self.directory().find(name)
    }

    pub fn read_file(&mut self, entry: &DirectoryEntry) -> Result<String> {
        let content = self.chain().read_chain(entry.head.as_ref())?;

        let len = content.chars().count() as u64;
        if len != entry.size_chars {
            log::warn!(
                "'{}': cached size is {} chars, content has {len}",
                entry.name,
                entry.size_chars
            );
        }

        Ok(content)
    }

    /// Replace the content of a file.
    ///
    /// The entry is first persisted empty, then the old chain is freed
    /// completely, then the new chain is written and the entry updated.
    /// Blocks that cannot be freed are logged and left behind.
    pub fn rewrite_file(&mut self, entry: &mut DirectoryEntry, new_content: &str) -> Result<()> {
        let mut current = self.directory().get(&entry.name)?;
        if current.in_trash && !self.config.rewrite_trashed {
            return Err(FatError::validation(format!(
                "'{}' is in the trash",
                current.name
            )));
        }
        self.check_content(new_content)?;

        let old_head = current.head.take();
        current.size_chars = 0;
        current.modified_at = Timestamp::now();
        self.directory().update(&current)?;

        let freed = self.chain().free_chain(old_head.as_ref())?;
        if let Some(err) = freed.incomplete {
            log::warn!("rewriting '{}': old chain not fully freed: {err}", current.name);
        }

        current.head = self.chain().write_chain(new_content, &current.name)?;
        current.size_chars = new_content.chars().count() as u64;
        current.modified_at = Timestamp::now();
        self.directory().update(&current)?;

        log::debug!(
            "rewrote '{}' ({} chars, {} old block(s) freed)",
            current.name,
            current.size_chars,
            freed.freed
        );
        *entry = current;
        Ok(())
    }

    /// Move a file to the trash. Its blocks are left alone.
    pub fn trash_file(&mut self, entry: &mut DirectoryEntry) -> Result<()> {
        let mut current = self.directory().get(&entry.name)?;
        self.directory().mark_trashed(&mut current)?;
        log::debug!("trashed '{}'", current.name);
        *entry = current;
        Ok(())
    }

    /// Bring a file back from the trash.
    pub fn restore_file(&mut self, entry: &mut DirectoryEntry) -> Result<()> {
        let mut current = self.directory().get(&entry.name)?;
        self.directory().mark_restored(&mut current)?;
        log::debug!("restored '{}'", current.name);
        *entry = current;
        Ok(())
    }
}
