//! Directory entry records.
//!
//! ```toml
//! name = "note"
//! head_block_ref = "note.0.blk"
//! in_trash = true
//! size_chars = 45
//! created_at = "2026-10-16T09:30:00.123456789Z"
//! modified_at = "2026-10-16T09:30:00.123456789Z"
//! deleted_at = "2026-10-16T09:41:07.5Z"
//! ```
//!
//! `deleted_at` is present iff `in_trash` is true; `head_block_ref` is
//! empty iff `size_chars` is zero.
use serde::{Deserialize, Serialize};

use crate::{BlockRef, FatError, Result, Timestamp};

#[derive(Serialize, Deserialize)]
struct EntryRecord {
    name: String,
    head_block_ref: String,
    in_trash: bool,
    size_chars: u64,
    created_at: String,
    modified_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<String>,
}

/// Metadata of a logical file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub(crate) name: String,
    pub(crate) head: Option<BlockRef>,
    pub(crate) in_trash: bool,
    pub(crate) size_chars: u64,
    pub(crate) created_at: Timestamp,
    pub(crate) modified_at: Timestamp,
    pub(crate) deleted_at: Option<Timestamp>,
}

impl DirectoryEntry {
    pub(crate) fn new(name: &str, now: Timestamp) -> Self {
        Self {
            name: name.to_owned(),
            head: None,
            in_trash: false,
            size_chars: 0,
            created_at: now,
            modified_at: now,
            deleted_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn in_trash(&self) -> bool {
        self.in_trash
    }

    /// Content length in characters, as cached at the last write.
    pub fn size_chars(&self) -> u64 {
        self.size_chars
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn modified_at(&self) -> Timestamp {
        self.modified_at
    }

    pub fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }

    /// Whether the file has any content blocks.
    pub fn has_blocks(&self) -> bool {
        self.head.is_some()
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.in_trash != self.deleted_at.is_some() {
            return Err(format!(
                "in_trash = {} but deleted_at is {}",
                self.in_trash,
                if self.deleted_at.is_some() { "set" } else { "unset" }
            ));
        }
        if self.head.is_none() != (self.size_chars == 0) {
            return Err(format!(
                "size_chars = {} disagrees with head_block_ref = {:?}",
                self.size_chars,
                BlockRef::to_persisted(self.head.as_ref())
            ));
        }

        Ok(())
    }

    /// Serialize to the text stored under `record`.
    pub(crate) fn encode(&self, record: &str) -> Result<String> {
        self.check().map_err(FatError::validation)?;

        let ts = |t: Timestamp| t.to_rfc3339().map_err(|err| FatError::format(record, err));
        let raw = EntryRecord {
            name: self.name.clone(),
            head_block_ref: BlockRef::to_persisted(self.head.as_ref()),
            in_trash: self.in_trash,
            size_chars: self.size_chars,
            created_at: ts(self.created_at)?,
            modified_at: ts(self.modified_at)?,
            deleted_at: self.deleted_at.map(ts).transpose()?,
        };
        toml::to_string(&raw).map_err(|err| FatError::format(record, err))
    }

    /// Parse the text stored under `record`.
    pub(crate) fn decode(record: &str, text: &str) -> Result<Self> {
        let raw: EntryRecord = toml::from_str(text).map_err(|err| FatError::format(record, err))?;

        let ts = |field: &str, raw: &str| {
            Timestamp::parse(raw)
                .map_err(|err| FatError::format(record, format!("bad {field} {raw:?}: {err}")))
        };
        let entry = Self {
            created_at: ts("created_at", &raw.created_at)?,
            modified_at: ts("modified_at", &raw.modified_at)?,
            deleted_at: raw
                .deleted_at
                .as_deref()
                .map(|raw| ts("deleted_at", raw))
                .transpose()?,
            name: raw.name,
            head: BlockRef::from_persisted(raw.head_block_ref),
            in_trash: raw.in_trash,
            size_chars: raw.size_chars,
        };
        entry
            .check()
            .map_err(|reason| FatError::format(record, reason))?;

        Ok(entry)
    }
}
