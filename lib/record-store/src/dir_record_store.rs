use camino::{Utf8Path, Utf8PathBuf};
use std::io::{ErrorKind, Result};

use crate::RecordStore;

/// A record store backed by a host directory: one file per record,
/// the file name being the record name.
pub struct DirRecordStore {
    root: Utf8PathBuf,
}

impl DirRecordStore {
    /// Open an existing directory.
    pub fn open(root: &Utf8Path) -> Result<Self> {
        if !root.is_dir() {
            log::debug!("Record store root {root} is not a directory.");
            return Err(ErrorKind::NotFound.into());
        }

        Ok(Self {
            root: root.to_owned(),
        })
    }

    /// Create the directory (and its parents) if needed, then open it.
    pub fn create(root: &Utf8Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Self::open(root)
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> Result<Utf8PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
        {
            log::debug!("Bad record name {name:?}.");
            return Err(ErrorKind::InvalidInput.into());
        }

        Ok(self.root.join(name))
    }
}

impl RecordStore for DirRecordStore {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_of(name)?.is_file())
    }

    fn read(&self, name: &str) -> Result<String> {
        std::fs::read_to_string(self.path_of(name)?)
    }

    fn write(&mut self, name: &str, text: &str) -> Result<()> {
        let path = self.path_of(name)?;
        log::trace!("dir store: write {path} ({} bytes)", text.len());
        std::fs::write(path, text)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let path = self.path_of(name)?;
        log::trace!("dir store: delete {path}");
        std::fs::remove_file(path)
    }

    fn list(&self, suffix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for dir_entry in std::fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            // Not something this store wrote.
            let Some(name) = dir_entry.file_name().to_str().map(str::to_owned) else {
                log::debug!("dir store: skipping non-UTF-8 file {:?}", dir_entry.file_name());
                continue;
            };
            if name.ends_with(suffix) {
                names.push(name);
            }
        }

        Ok(names)
    }
}
